// dumpコマンドハンドラー
//
// 移行元の内容を、指定した方言（省略時は移行先の方言）のSQLスクリプトとしてファイルへ書き出します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::config::Dialect;
use crate::services::dumper::{DumpReport, Dumper};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// dumpコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct DumpOutput {
    /// 出力先パス
    pub output_path: String,
    /// 出力したSQLの方言
    pub dialect: Dialect,
    /// ダンプ結果
    pub report: DumpReport,
    /// テキスト出力メッセージ
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for DumpOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// dumpコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct DumpCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 出力ファイル
    pub output: PathBuf,
    /// 出力するSQLの方言
    pub dialect: Option<String>,
    /// DDLを出力しない
    pub no_meta: bool,
    /// ページサイズの上書き
    pub page_size: Option<u64>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// dumpコマンドハンドラー
#[derive(Debug, Default)]
pub struct DumpCommandHandler {}

impl DumpCommandHandler {
    /// 新しいDumpCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// dumpコマンドを実行
    pub async fn execute(&self, command: &DumpCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        let dialect = match &command.dialect {
            Some(name) => name.parse::<Dialect>()?,
            None => context.config.target.dialect()?,
        };
        let page_size = command
            .page_size
            .unwrap_or(context.config.migration.max_page_size);

        let source = context.source_adapter()?;
        let renderer = context.registry.create_offline(dialect);
        let cancel = context.cancellation_token();

        let file = File::create(&command.output)
            .with_context(|| format!("Failed to create output file: {:?}", command.output))?;
        let mut writer = BufWriter::new(file);

        let report = Dumper::new(source.as_ref(), renderer.as_ref(), page_size)
            .with_metadata(!command.no_meta)
            .dump(&mut writer, &cancel)
            .await
            .with_context(|| "Dump failed")?;

        let output_path = command.output.display().to_string();
        let text_message = format!(
            "{} {} rows from {} tables ({}) -> {}",
            "Dumped".green().bold(),
            report.rows,
            report.tables,
            dialect,
            output_path
        );

        let output = DumpOutput {
            output_path,
            dialect,
            report,
            text_message,
        };
        render_output(&output, &command.format)
    }
}
