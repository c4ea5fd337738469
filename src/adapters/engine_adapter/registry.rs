// アダプターレジストリ
//
// 設定ファイルの `engine` 名からアダプターを構築するための明示的な対応表。
// 既定のエンジンはコンパイル時に登録され、任意のエンジン名を追加登録できます。

use super::{EngineAdapter, SqlEngineAdapter};
use crate::core::config::{DatabaseConfig, Dialect};
use crate::core::error::DatabaseError;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

/// アダプターのコンストラクター
pub type AdapterConstructor =
    fn(&DatabaseConfig) -> Result<Box<dyn EngineAdapter>, DatabaseError>;

/// エンジン名 -> コンストラクターの対応表
///
/// エンジン名は大文字小文字を区別しません。
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    constructors: BTreeMap<String, AdapterConstructor>,
}

impl AdapterRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// PostgreSQL・MySQL・SQLiteとその別名を登録したレジストリを作成
    pub fn with_default_engines() -> Self {
        let mut registry = Self::new();
        registry.register("postgresql", postgres_adapter);
        registry.register("postgres", postgres_adapter);
        registry.register("mysql", mysql_adapter);
        registry.register("mariadb", mysql_adapter);
        registry.register("sqlite", sqlite_adapter);
        registry.register("sqlite3", sqlite_adapter);
        registry
    }

    /// エンジン名を登録（同名の登録は上書き）
    pub fn register(&mut self, engine: &str, constructor: AdapterConstructor) {
        self.constructors
            .insert(engine.to_ascii_lowercase(), constructor);
    }

    /// 登録済みのエンジン名（昇順）
    pub fn engine_names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// エンジン名が登録されているか
    pub fn contains(&self, engine: &str) -> bool {
        self.constructors.contains_key(&engine.to_ascii_lowercase())
    }

    /// 設定からアダプターを構築
    ///
    /// # Errors
    ///
    /// エンジン名が未登録の場合、または接続文字列が不正な場合
    pub fn create(&self, config: &DatabaseConfig) -> Result<Box<dyn EngineAdapter>> {
        let constructor = self
            .constructors
            .get(&config.engine.to_ascii_lowercase())
            .ok_or_else(|| {
                anyhow!(
                    "Unknown database engine: '{}' (available: {})",
                    config.engine,
                    self.engine_names().join(", ")
                )
            })?;

        Ok(constructor(config)?)
    }

    /// 接続を持たないアダプターを作成（ダンプのSQL描画用）
    pub fn create_offline(&self, dialect: Dialect) -> Box<dyn EngineAdapter> {
        Box::new(SqlEngineAdapter::offline(dialect))
    }
}

fn postgres_adapter(config: &DatabaseConfig) -> Result<Box<dyn EngineAdapter>, DatabaseError> {
    Ok(Box::new(SqlEngineAdapter::connect_lazy(
        Dialect::PostgreSQL,
        config,
    )?))
}

fn mysql_adapter(config: &DatabaseConfig) -> Result<Box<dyn EngineAdapter>, DatabaseError> {
    Ok(Box::new(SqlEngineAdapter::connect_lazy(Dialect::MySQL, config)?))
}

fn sqlite_adapter(config: &DatabaseConfig) -> Result<Box<dyn EngineAdapter>, DatabaseError> {
    Ok(Box::new(SqlEngineAdapter::connect_lazy(Dialect::SQLite, config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_sqlite(_config: &DatabaseConfig) -> Result<Box<dyn EngineAdapter>, DatabaseError> {
        Ok(Box::new(SqlEngineAdapter::offline(Dialect::SQLite)))
    }

    #[test]
    fn test_default_engines_include_aliases() {
        let registry = AdapterRegistry::with_default_engines();
        assert_eq!(
            registry.engine_names(),
            vec!["mariadb", "mysql", "postgres", "postgresql", "sqlite", "sqlite3"]
        );
        assert!(registry.contains("PostgreSQL"));
        assert!(!registry.contains("oracle"));
    }

    #[test]
    fn test_unknown_engine_lists_available_names() {
        let registry = AdapterRegistry::with_default_engines();
        let mut config = DatabaseConfig::sqlite("app.db");
        config.engine = "oracle".to_string();

        let error = registry.create(&config).err().unwrap();
        let message = error.to_string();
        assert!(message.contains("oracle"));
        assert!(message.contains("sqlite3"));
    }

    #[test]
    fn test_register_custom_engine() {
        let mut registry = AdapterRegistry::new();
        registry.register("Embedded", offline_sqlite);

        let mut config = DatabaseConfig::sqlite("app.db");
        config.engine = "embedded".to_string();
        let adapter = registry.create(&config).unwrap();
        assert_eq!(adapter.dialect(), Dialect::SQLite);
    }
}
