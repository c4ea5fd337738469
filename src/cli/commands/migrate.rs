// migrateコマンドハンドラー
//
// 移行先データベースの準備、前スクリプト、移行本体、後スクリプトの順に実行します。

use crate::adapters::engine_adapter::EngineAdapter;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::config::MigrationSetting;
use crate::services::migration_orchestrator::{MigrationOrchestrator, MigrationReport};
use crate::services::script_interpreter::{ScriptInterpreter, StatementTerminator};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// migrateコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct MigrateOutput {
    /// 移行結果
    pub report: MigrationReport,
    /// 前スクリプトで実行した文の数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_script_statements: Option<usize>,
    /// 後スクリプトで実行した文の数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_script_statements: Option<usize>,
    /// テキスト出力メッセージ
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for MigrateOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// migrateコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct MigrateCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// メタデータを移行しない
    pub no_meta: bool,
    /// データを移行しない
    pub no_data: bool,
    /// ページサイズの上書き
    pub page_size: Option<u64>,
    /// 移行前に移行先データベースを作成
    pub create_target: bool,
    /// 移行前に移行先データベースを削除
    pub drop_target: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

impl MigrateCommand {
    /// 設定ファイルの移行設定にコマンドラインの指定を反映
    pub fn effective_setting(&self, base: &MigrationSetting) -> Result<MigrationSetting> {
        let mut setting = base.clone();
        if self.no_meta {
            setting.include_meta = false;
        }
        if self.no_data {
            setting.include_data = false;
        }
        if let Some(page_size) = self.page_size {
            setting.max_page_size = page_size;
        }
        setting.validate()?;
        Ok(setting)
    }
}

/// migrateコマンドハンドラー
#[derive(Debug, Default)]
pub struct MigrateCommandHandler {}

impl MigrateCommandHandler {
    /// 新しいMigrateCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// migrateコマンドを実行
    pub async fn execute(&self, command: &MigrateCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let setting = command.effective_setting(&context.config.migration)?;

        let source = context.source_adapter()?;
        let target = context.target_adapter()?;
        let cancel = context.cancellation_token();

        if command.drop_target {
            target
                .drop_database_if_exists(&cancel)
                .await
                .with_context(|| "Failed to drop target database")?;
        }
        if command.create_target {
            target
                .create_database(&cancel)
                .await
                .with_context(|| "Failed to create target database")?;
        }

        let pre_script_statements = match &setting.pre_script {
            Some(path) => Some(run_script(target.as_ref(), path, &cancel).await?),
            None => None,
        };

        let report = MigrationOrchestrator::new(source.as_ref(), target.as_ref(), &setting)
            .run(&cancel)
            .await
            .with_context(|| "Migration failed")?;

        let post_script_statements = match &setting.post_script {
            Some(path) => Some(run_script(target.as_ref(), path, &cancel).await?),
            None => None,
        };

        let text_message = self.format_report(&report);
        let output = MigrateOutput {
            report,
            pre_script_statements,
            post_script_statements,
            text_message,
        };

        render_output(&output, &command.format)
    }

    fn format_report(&self, report: &MigrationReport) -> String {
        let mut text = String::new();
        let _ = writeln!(
            text,
            "{} ({} -> {})",
            "Migration completed".green().bold(),
            report.source,
            report.target
        );

        let width = report.tables.iter().map(|t| t.table.len()).max().unwrap_or(0);
        for table in &report.tables {
            let _ = writeln!(
                text,
                "  {:<width$}  {:>8} rows  {:>4} pages",
                table.table,
                table.rows,
                table.pages,
                width = width
            );
        }

        let _ = write!(
            text,
            "Total: {} rows in {} tables ({} ms)",
            report.total_rows(),
            report.tables.len(),
            report.duration_ms
        );
        text
    }
}

/// 移行先で前後スクリプトを実行
async fn run_script(
    target: &dyn EngineAdapter,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<usize> {
    ScriptInterpreter::for_dialect(target.dialect(), StatementTerminator::semicolon())
        .execute_file(path, target, cancel)
        .await
        .with_context(|| format!("Failed to run script: {:?}", path))
}
