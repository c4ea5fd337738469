// エンジンアダプター
//
// 移行オーケストレーターとダンパーが使用する、データベースエンジンごとの操作の抽象化。
// SQLを実行できるエンジンは StatementExecutor（スクリプト実行）と
// SqlEvaluator（式評価）も提供します。

mod registry;
mod sql_adapter;

pub use registry::{AdapterConstructor, AdapterRegistry};
pub use sql_adapter::SqlEngineAdapter;

use crate::core::config::Dialect;
use crate::core::error::{DatabaseError, MigrationError};
use crate::core::schema::{DataTypeDescriptor, DatabaseDescriptor, TableDescriptor};
use crate::core::value::{PageInfo, RowBatch, SqlValue};
use async_trait::async_trait;
use std::io::Write;
use tokio_util::sync::CancellationToken;

/// SQL文実行インターフェース
///
/// スクリプトインタープリターが1文ずつ実行するために使用します。
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// SQL文を実行し、影響を受けた行数を返す
    async fn execute(&self, sql: &str, cancel: &CancellationToken) -> Result<u64, DatabaseError>;
}

/// スカラー式評価インターフェース
#[async_trait]
pub trait SqlEvaluator: Send + Sync {
    /// 1行1列を返すSELECT文を実行し、指定した型の値として取得
    async fn evaluate_scalar(
        &self,
        sql: &str,
        data_type: &DataTypeDescriptor,
        cancel: &CancellationToken,
    ) -> Result<SqlValue, DatabaseError>;
}

/// メタデータ適用フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataPhase {
    /// データ転送前（スキーマ・テーブル・プライマリキー）
    Pre,
    /// データ転送後（インデックス・外部キー・自動増分の再設定）
    Post,
}

/// エンジンアダプタートレイト
///
/// 1つのデータベースに対する移行操作をまとめたインターフェース。
/// オーケストレーターは移行元と移行先にそれぞれ1つのアダプターを使用します。
#[async_trait]
pub trait EngineAdapter: StatementExecutor + SqlEvaluator {
    /// 対象の方言
    fn dialect(&self) -> Dialect;

    /// データベースの構造を取得
    async fn get_database_descriptor(
        &self,
        cancel: &CancellationToken,
    ) -> Result<DatabaseDescriptor, MigrationError>;

    /// データベースを作成
    async fn create_database(&self, cancel: &CancellationToken) -> Result<(), MigrationError>;

    /// データベースが存在すれば削除
    async fn drop_database_if_exists(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError>;

    /// データ転送前のメタデータを適用
    async fn apply_metadata_pre(
        &self,
        database: &DatabaseDescriptor,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError>;

    /// データ転送後のメタデータを適用
    async fn apply_metadata_post(
        &self,
        database: &DatabaseDescriptor,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError>;

    /// テーブルの行数を取得
    async fn count_rows(
        &self,
        table: &TableDescriptor,
        cancel: &CancellationToken,
    ) -> Result<u64, MigrationError>;

    /// 1ページ分の行を読み出す
    async fn read_page(
        &self,
        table: &TableDescriptor,
        page: PageInfo,
        cancel: &CancellationToken,
    ) -> Result<RowBatch, MigrationError>;

    /// 1ページ分の行を書き込む
    async fn write_page(
        &self,
        table: &TableDescriptor,
        batch: &RowBatch,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError>;

    /// メタデータ適用に使用するDDL文（ダンプ出力にも使用）
    fn metadata_statements(
        &self,
        database: &DatabaseDescriptor,
        phase: MetadataPhase,
    ) -> Result<Vec<String>, MigrationError>;

    /// 行をこのエンジン向けのINSERT文として出力
    ///
    /// 各行は `INSERT INTO <table>(<cols>) VALUES (<literals>);` と空行で出力されます。
    fn dump_table(
        &self,
        table: &TableDescriptor,
        batch: &RowBatch,
        sink: &mut (dyn Write + Send),
    ) -> Result<(), MigrationError>;
}
