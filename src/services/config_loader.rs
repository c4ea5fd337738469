// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込み、検証する
    ///
    /// 前後スクリプトの相対パスは設定ファイルのディレクトリを基準に解決されます。
    pub fn from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut config: Config = content.parse()?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.migration.pre_script = config
            .migration
            .pre_script
            .take()
            .map(|script| Self::resolve_path(base, &script));
        config.migration.post_script = config
            .migration
            .post_script
            .take()
            .map(|script| Self::resolve_path(base, &script));

        debug!(path = ?path, source = %config.source.engine, target = %config.target.engine, "Loaded config");
        Ok(config)
    }

    /// デフォルトパスから設定を読み込む
    pub fn load_default() -> Result<Config> {
        let path = Path::new(Config::DEFAULT_CONFIG_PATH);
        Self::from_file(path)
    }

    /// 相対パスを基準ディレクトリから解決
    pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }
}
