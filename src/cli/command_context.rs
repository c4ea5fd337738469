// コマンド共通コンテキスト
//
// 設定ファイル読み込み・アダプター構築・キャンセル処理の重複をCLI層で集約する。

use crate::adapters::engine_adapter::{AdapterRegistry, EngineAdapter};
use crate::core::config::Config;
use crate::services::config_loader::ConfigLoader;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub registry: AdapterRegistry,
}

impl CommandContext {
    /// プロジェクトルートから設定を読み込んでコンテキストを作成
    pub fn load(project_path: PathBuf) -> Result<Self> {
        Self::load_with_config(project_path, None)
    }

    /// カスタム設定ファイルパスを指定してコンテキストを作成
    pub fn load_with_config(
        project_path: PathBuf,
        custom_config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = custom_config_path
            .unwrap_or_else(|| project_path.join(Config::DEFAULT_CONFIG_PATH));

        if !config_path.exists() {
            return Err(anyhow!(
                "Config file not found: {:?}. Create it with 'source' and 'target' database settings.",
                config_path
            ));
        }

        let config =
            ConfigLoader::from_file(&config_path).with_context(|| "Failed to read config file")?;

        Ok(Self {
            project_path,
            config_path,
            config,
            registry: AdapterRegistry::with_default_engines(),
        })
    }

    /// 移行元アダプターを作成
    pub fn source_adapter(&self) -> Result<Box<dyn EngineAdapter>> {
        self.registry
            .create(&self.config.source)
            .with_context(|| "Failed to create source adapter")
    }

    /// 移行先アダプターを作成
    pub fn target_adapter(&self) -> Result<Box<dyn EngineAdapter>> {
        self.registry
            .create(&self.config.target)
            .with_context(|| "Failed to create target adapter")
    }

    /// Ctrl+C でキャンセルされるトークンを作成
    pub fn cancellation_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Received Ctrl+C, cancelling after the current statement");
                child.cancel();
            }
        });
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let error = CommandContext::load(dir.path().to_path_buf()).unwrap_err();
        assert!(error.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_with_custom_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(
            &path,
            "version: \"1.0\"\nsource:\n  engine: sqlite\n  database: a.db\ntarget:\n  engine: sqlite3\n  database: b.db\n",
        )
        .unwrap();

        let context =
            CommandContext::load_with_config(dir.path().to_path_buf(), Some(path.clone())).unwrap();
        assert_eq!(context.config_path, path);
        assert_eq!(context.config.target.engine, "sqlite3");
        assert!(context.registry.contains("sqlite3"));
    }
}
