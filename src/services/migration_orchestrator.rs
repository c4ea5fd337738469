// 移行オーケストレーター
//
// 移行元アダプターからデータベース構造を取得し、
// メタデータ(前) -> データ転送 -> メタデータ(後) の順に移行先アダプターへ適用します。
// テーブルは記述子の順に1つずつ、ページ単位で転送されます。

use crate::adapters::engine_adapter::EngineAdapter;
use crate::core::config::{Dialect, MigrationSetting};
use crate::core::error::MigrationError;
use crate::core::schema::{DatabaseDescriptor, TableDescriptor};
use crate::core::value::PageInfo;
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// 移行の段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStage {
    Start,
    MetadataPre,
    DataTransfer,
    MetadataPost,
    Done,
}

impl std::fmt::Display for MigrationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MigrationStage::Start => "start",
            MigrationStage::MetadataPre => "metadata-pre",
            MigrationStage::DataTransfer => "data-transfer",
            MigrationStage::MetadataPost => "metadata-post",
            MigrationStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// テーブルごとの転送結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableTransferReport {
    /// テーブル名（schema.table）
    pub table: String,
    /// 移行元の行数
    pub source_rows: u64,
    /// 書き込んだ行数
    pub rows: u64,
    /// 書き込んだページ数
    pub pages: u64,
    /// 読み出し回数（空ページを含む）
    pub reads: u64,
}

/// 移行結果
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// 移行元の方言
    pub source: Dialect,
    /// 移行先の方言
    pub target: Dialect,
    /// 実行した段階
    pub stages: Vec<MigrationStage>,
    /// テーブルごとの転送結果
    pub tables: Vec<TableTransferReport>,
    /// 所要時間（ミリ秒）
    pub duration_ms: u64,
}

impl MigrationReport {
    /// 転送した行数の合計
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// 段階を実行したかどうか
    pub fn ran(&self, stage: MigrationStage) -> bool {
        self.stages.contains(&stage)
    }
}

/// 移行オーケストレーター
///
/// アダプターへの呼び出しは常に1つずつ順番に行います。リトライはしません。
pub struct MigrationOrchestrator<'a> {
    source: &'a dyn EngineAdapter,
    target: &'a dyn EngineAdapter,
    setting: &'a MigrationSetting,
}

impl<'a> MigrationOrchestrator<'a> {
    /// 新しいMigrationOrchestratorを作成
    ///
    /// # Arguments
    ///
    /// * `source` - 移行元アダプター
    /// * `target` - 移行先アダプター（データベースは作成済みであること）
    /// * `setting` - 移行設定
    pub fn new(
        source: &'a dyn EngineAdapter,
        target: &'a dyn EngineAdapter,
        setting: &'a MigrationSetting,
    ) -> Self {
        Self {
            source,
            target,
            setting,
        }
    }

    /// 移行を実行
    ///
    /// 失敗した時点で処理を中断し、移行先の途中結果は巻き戻しません。
    pub async fn run(&self, cancel: &CancellationToken) -> Result<MigrationReport, MigrationError> {
        let started = Instant::now();
        let mut report = MigrationReport {
            source: self.source.dialect(),
            target: self.target.dialect(),
            stages: vec![MigrationStage::Start],
            tables: Vec::new(),
            duration_ms: 0,
        };

        info!(
            source = %report.source,
            target = %report.target,
            include_meta = self.setting.include_meta,
            include_data = self.setting.include_data,
            "Starting migration"
        );

        ensure_not_cancelled(cancel, MigrationStage::Start)?;
        let database = self.source.get_database_descriptor(cancel).await?;
        info!(tables = database.table_count(), "Loaded source database structure");

        if self.setting.include_meta {
            ensure_not_cancelled(cancel, MigrationStage::MetadataPre)?;
            self.target.apply_metadata_pre(&database, cancel).await?;
            report.stages.push(MigrationStage::MetadataPre);
        }

        if self.setting.include_data {
            report.tables = self.transfer_data(&database, cancel).await?;
            report.stages.push(MigrationStage::DataTransfer);
        }

        if self.setting.include_meta {
            ensure_not_cancelled(cancel, MigrationStage::MetadataPost)?;
            self.target.apply_metadata_post(&database, cancel).await?;
            report.stages.push(MigrationStage::MetadataPost);
        }

        report.stages.push(MigrationStage::Done);
        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            tables = report.tables.len(),
            rows = report.total_rows(),
            duration_ms = report.duration_ms,
            "Migration finished"
        );

        Ok(report)
    }

    async fn transfer_data(
        &self,
        database: &DatabaseDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Vec<TableTransferReport>, MigrationError> {
        let mut reports = Vec::with_capacity(database.tables.len());
        for table in &database.tables {
            let report = self.transfer_table(table, cancel).await.map_err(|e| {
                if let MigrationError::Database(inner) = e.root() {
                    if let Some(sql) = inner.sql() {
                        debug!(table = %table.display_name(), sql, "Failed statement");
                    }
                }
                e.in_table(table.display_name())
            })?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// 1テーブル分のデータを転送
    ///
    /// 取得件数がページサイズ未満になった時点で終了します。
    /// 行数がページサイズの倍数の場合は最後に空ページを1回読み、空ページは書き込みません。
    async fn transfer_table(
        &self,
        table: &TableDescriptor,
        cancel: &CancellationToken,
    ) -> Result<TableTransferReport, MigrationError> {
        let name = table.display_name();
        let source_rows = self.source.count_rows(table, cancel).await?;
        let mut report = TableTransferReport {
            table: name.clone(),
            source_rows,
            rows: 0,
            pages: 0,
            reads: 0,
        };

        if source_rows == 0 {
            info!(table = %name, "Table is empty, skipping data transfer");
            return Ok(report);
        }

        let page_size = self.setting.max_page_size.max(1);
        let mut page = PageInfo::new(0, page_size);
        info!(table = %name, rows = source_rows, page_size, "Transferring table");

        loop {
            ensure_not_cancelled(cancel, MigrationStage::DataTransfer)?;

            let batch = self.source.read_page(table, page, cancel).await?;
            report.reads += 1;
            let fetched = batch.len() as u64;

            if !batch.is_empty() {
                self.target.write_page(table, &batch, cancel).await?;
                report.pages += 1;
                report.rows += fetched;
                debug!(
                    table = %name,
                    offset = page.offset,
                    rows = fetched,
                    transferred = report.rows,
                    "Transferred page"
                );
            }

            if fetched < page_size {
                break;
            }
            page = page.next();
        }

        info!(table = %name, rows = report.rows, pages = report.pages, "Table transferred");
        Ok(report)
    }
}

fn ensure_not_cancelled(
    cancel: &CancellationToken,
    stage: MigrationStage,
) -> Result<(), MigrationError> {
    if cancel.is_cancelled() {
        return Err(MigrationError::Cancelled {
            stage: stage.to_string(),
        });
    }
    Ok(())
}
