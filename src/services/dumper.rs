// ダンパー
//
// 移行元からページ単位で行を読み出し、出力先方言のアダプターでINSERT文として書き出します。
// 出力はスクリプトインタープリター（セミコロン終端）でそのまま再生できます。

use crate::adapters::engine_adapter::{EngineAdapter, MetadataPhase};
use crate::core::error::MigrationError;
use crate::core::naming::APP_NAME;
use crate::core::schema::TableDescriptor;
use crate::core::value::PageInfo;
use serde::Serialize;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// ダンプ結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DumpReport {
    /// 出力したテーブル数
    pub tables: usize,
    /// 出力した行数
    pub rows: u64,
    /// 出力したDDL文の数
    pub ddl_statements: usize,
}

/// ダンパー
pub struct Dumper<'a> {
    source: &'a dyn EngineAdapter,
    renderer: &'a dyn EngineAdapter,
    page_size: u64,
    include_meta: bool,
}

impl<'a> Dumper<'a> {
    /// 新しいDumperを作成
    ///
    /// # Arguments
    ///
    /// * `source` - 行を読み出すアダプター
    /// * `renderer` - 出力先方言のSQLを描画するアダプター（接続不要）
    /// * `page_size` - 1ページあたりの行数
    pub fn new(source: &'a dyn EngineAdapter, renderer: &'a dyn EngineAdapter, page_size: u64) -> Self {
        Self {
            source,
            renderer,
            page_size: page_size.max(1),
            include_meta: false,
        }
    }

    /// テーブル作成・インデックスなどのDDLも出力する
    pub fn with_metadata(mut self, include_meta: bool) -> Self {
        self.include_meta = include_meta;
        self
    }

    /// ダンプを出力
    pub async fn dump(
        &self,
        sink: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<DumpReport, MigrationError> {
        let database = self.source.get_database_descriptor(cancel).await?;
        let mut report = DumpReport::default();

        writeln!(
            sink,
            "-- {} dump: {} -> {}",
            APP_NAME,
            self.source.dialect(),
            self.renderer.dialect()
        )?;
        writeln!(sink)?;

        if self.include_meta {
            report.ddl_statements +=
                self.write_statements(sink, &self.renderer.metadata_statements(&database, MetadataPhase::Pre)?)?;
        }

        for table in &database.tables {
            let rows = self
                .dump_table(table, sink, cancel)
                .await
                .map_err(|e| e.in_table(table.display_name()))?;
            report.tables += 1;
            report.rows += rows;
        }

        if self.include_meta {
            report.ddl_statements +=
                self.write_statements(sink, &self.renderer.metadata_statements(&database, MetadataPhase::Post)?)?;
        }

        sink.flush()?;
        info!(tables = report.tables, rows = report.rows, "Dump finished");
        Ok(report)
    }

    fn write_statements(
        &self,
        sink: &mut (dyn Write + Send),
        statements: &[String],
    ) -> Result<usize, MigrationError> {
        for statement in statements {
            writeln!(sink, "{};", statement)?;
            writeln!(sink)?;
        }
        Ok(statements.len())
    }

    /// 1テーブル分の行を出力（移行と同じく短いページで終了）
    async fn dump_table(
        &self,
        table: &TableDescriptor,
        sink: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<u64, MigrationError> {
        let total = self.source.count_rows(table, cancel).await?;
        if total == 0 {
            return Ok(0);
        }

        let mut rows = 0;
        let mut page = PageInfo::new(0, self.page_size);
        loop {
            if cancel.is_cancelled() {
                return Err(MigrationError::Cancelled {
                    stage: "dump".to_string(),
                });
            }

            let batch = self.source.read_page(table, page, cancel).await?;
            let fetched = batch.len() as u64;
            if !batch.is_empty() {
                self.renderer.dump_table(table, &batch, sink)?;
                rows += fetched;
                debug!(table = %table.display_name(), offset = page.offset, rows = fetched, "Dumped page");
            }

            if fetched < self.page_size {
                break;
            }
            page = page.next();
        }

        Ok(rows)
    }
}
