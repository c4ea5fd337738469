// データベース接続アダプター
//
// SQLxのAnyドライバーを使用したデータベース接続の管理を行います。
// PostgreSQL、MySQL、SQLiteに対応した統一されたインターフェースを提供します。

use crate::adapters::connection_string::{
    build_connection_string, build_server_connection_string, is_sqlite_memory,
};
use crate::core::config::{DatabaseConfig, Dialect};
use crate::core::error::DatabaseError;
use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool};
use std::time::Duration;
use tracing::debug;

/// 既定のプール最大接続数
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 既定の接続取得タイムアウト（秒）
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// データベース接続サービス
///
/// データベース接続プールの初期化と管理を行います。
#[derive(Debug, Clone, Default)]
pub struct DatabaseConnectionService;

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self
    }

    /// 遅延接続のプールを作成
    ///
    /// 最初のクエリ実行時に接続されます。アダプターレジストリから使用されます。
    pub fn create_lazy_pool(
        &self,
        dialect: Dialect,
        config: &DatabaseConfig,
    ) -> Result<AnyPool, DatabaseError> {
        let connection_string = build_connection_string(dialect, config);
        debug!(%dialect, database = %config.database, "Creating lazy connection pool");

        self.create_pool_options(dialect, config)
            .connect_lazy(&connection_string)
            .map_err(|e| DatabaseError::Connection {
                message: format!("接続文字列が不正です: {}", dialect),
                cause: e.to_string(),
            })
    }

    /// サーバーレベルの接続プールを作成（データベース作成/削除用）
    pub async fn create_server_pool(
        &self,
        dialect: Dialect,
        config: &DatabaseConfig,
    ) -> Result<AnyPool, DatabaseError> {
        let connection_string =
            build_server_connection_string(dialect, config).ok_or_else(|| {
                DatabaseError::Connection {
                    message: format!("サーバー接続は利用できません: {}", dialect),
                    cause: "engine has no server".to_string(),
                }
            })?;

        PoolOptions::<Any>::new()
            .max_connections(1)
            .acquire_timeout(self.acquire_timeout(config))
            .connect(&connection_string)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!("サーバーへの接続に失敗しました: {}", dialect),
                cause: e.to_string(),
            })
    }

    /// プールオプションを作成
    ///
    /// SQLiteのインメモリDBは接続ごとに別のDBになるため、接続数を1に制限します。
    pub fn create_pool_options(&self, dialect: Dialect, config: &DatabaseConfig) -> PoolOptions<Any> {
        let max_connections = if dialect == Dialect::SQLite && is_sqlite_memory(&config.database) {
            1
        } else {
            DEFAULT_MAX_CONNECTIONS
        };

        PoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(self.acquire_timeout(config))
    }

    fn acquire_timeout(&self, config: &DatabaseConfig) -> Duration {
        Duration::from_secs(config.timeout.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS))
    }

    /// 接続プールを閉じる
    pub async fn close_pool(&self, pool: &AnyPool) {
        pool.close().await;
    }
}
