// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の型定義と検証を行います。
// ソース/ターゲットのデータベース接続設定と、移行設定（MigrationSetting）を保持します。

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// データベース方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    #[serde(rename = "postgresql")]
    PostgreSQL,
    #[serde(rename = "mysql")]
    MySQL,
    #[serde(rename = "sqlite")]
    SQLite,
}

impl Dialect {
    /// 方言の既定ポート番号
    pub fn default_port(&self) -> u16 {
        match self {
            Dialect::PostgreSQL => 5432,
            Dialect::MySQL => 3306,
            Dialect::SQLite => 0,
        }
    }

    /// スキーマ（名前空間）を持つ方言かどうか
    pub fn supports_schemas(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::PostgreSQL => write!(f, "postgresql"),
            Dialect::MySQL => write!(f, "mysql"),
            Dialect::SQLite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(Dialect::PostgreSQL),
            "mysql" | "mariadb" => Ok(Dialect::MySQL),
            "sqlite" | "sqlite3" => Ok(Dialect::SQLite),
            other => Err(anyhow!(
                "Unsupported database dialect: {}. Please specify one of: postgresql, mysql, sqlite.",
                other
            )),
        }
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// 移行元データベース
    pub source: DatabaseConfig,

    /// 移行先データベース
    pub target: DatabaseConfig,

    /// 移行設定
    #[serde(default)]
    pub migration: MigrationSetting,
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = crate::core::naming::CONFIG_FILE;

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(anyhow!("Config file version is not specified"));
        }

        self.source
            .validate()
            .with_context(|| "Invalid config for 'source'")?;
        self.target
            .validate()
            .with_context(|| "Invalid config for 'target'")?;
        self.migration
            .validate()
            .with_context(|| "Invalid config for 'migration'")?;

        Ok(())
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}

/// データベース接続設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// エンジン名（アダプターレジストリで解決される）
    pub engine: String,

    /// ホスト名（SQLiteの場合は不要）
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号（省略時は方言の既定値）
    #[serde(default)]
    pub port: Option<u16>,

    /// データベース名（SQLiteの場合はファイルパス）
    pub database: String,

    /// ユーザー名
    #[serde(default)]
    pub user: Option<String>,

    /// パスワード
    #[serde(default)]
    pub password: Option<String>,

    /// 接続タイムアウト（秒）
    #[serde(default)]
    pub timeout: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

impl DatabaseConfig {
    /// SQLiteファイル用の設定を作成
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            engine: Dialect::SQLite.to_string(),
            host: String::new(),
            port: None,
            database: path.into(),
            user: None,
            password: None,
            timeout: None,
        }
    }

    /// エンジン名から方言を解決
    pub fn dialect(&self) -> Result<Dialect> {
        self.engine.parse()
    }

    /// 実際に使用するポート番号
    pub fn effective_port(&self) -> Result<u16> {
        Ok(self.port.unwrap_or(self.dialect()?.default_port()))
    }

    /// Validate database configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine.trim().is_empty() {
            return Err(anyhow!("Database engine is not specified"));
        }
        self.dialect()?;

        if self.database.is_empty() {
            return Err(anyhow!("Database name is not specified"));
        }

        Ok(())
    }
}

/// 移行設定
///
/// メタデータ/データそれぞれの移行有無、ページサイズ、前後に実行するスクリプトを保持します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationSetting {
    /// スキーマ（テーブル・インデックス・外部キー）を移行するか
    #[serde(default = "default_true")]
    pub include_meta: bool,

    /// 行データを移行するか
    #[serde(default = "default_true")]
    pub include_data: bool,

    /// データ転送の1ページあたり最大行数
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// 移行前にターゲットで実行するSQLスクリプト
    #[serde(default)]
    pub pre_script: Option<PathBuf>,

    /// 移行後にターゲットで実行するSQLスクリプト
    #[serde(default)]
    pub post_script: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_max_page_size() -> u64 {
    1000
}

impl Default for MigrationSetting {
    fn default() -> Self {
        Self {
            include_meta: true,
            include_data: true,
            max_page_size: default_max_page_size(),
            pre_script: None,
            post_script: None,
        }
    }
}

impl MigrationSetting {
    /// 移行設定を検証
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(anyhow!("max_page_size must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::PostgreSQL.to_string(), "postgresql");
        assert_eq!(Dialect::MySQL.to_string(), "mysql");
        assert_eq!(Dialect::SQLite.to_string(), "sqlite");
    }

    #[test]
    fn test_dialect_from_str_aliases() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSQL);
        assert_eq!("MariaDB".parse::<Dialect>().unwrap(), Dialect::MySQL);
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::SQLite);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_migration_setting_default() {
        let setting = MigrationSetting::default();
        assert!(setting.include_meta);
        assert!(setting.include_data);
        assert_eq!(setting.max_page_size, 1000);
        assert!(setting.validate().is_ok());
    }

    #[test]
    fn test_migration_setting_rejects_zero_page_size() {
        let setting = MigrationSetting {
            max_page_size: 0,
            ..MigrationSetting::default()
        };
        assert!(setting.validate().is_err());
    }

    #[test]
    fn test_effective_port_uses_dialect_default() {
        let config = DatabaseConfig {
            engine: "mysql".to_string(),
            host: "localhost".to_string(),
            port: None,
            database: "app".to_string(),
            user: None,
            password: None,
            timeout: None,
        };
        assert_eq!(config.effective_port().unwrap(), 3306);
    }
}
