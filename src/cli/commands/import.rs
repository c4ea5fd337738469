// importコマンドハンドラー
//
// SQLスクリプトをスクリプトインタープリターで1文ずつ移行先へ再生します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::{OutputFormat, TerminatorArg};
use crate::services::script_interpreter::{ScriptInterpreter, StatementTerminator};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// importコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutput {
    /// 入力スクリプト
    pub input_path: String,
    /// 実行した文の数
    pub statements: usize,
    /// テキスト出力メッセージ
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for ImportOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// importコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ImportCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 入力スクリプト
    pub input: PathBuf,
    /// 文の終端
    pub terminator: TerminatorArg,
    /// 出力フォーマット
    pub format: OutputFormat,
}

impl From<TerminatorArg> for StatementTerminator {
    fn from(arg: TerminatorArg) -> Self {
        match arg {
            TerminatorArg::Semicolon => StatementTerminator::semicolon(),
            TerminatorArg::Go => StatementTerminator::go(),
        }
    }
}

/// importコマンドハンドラー
#[derive(Debug, Default)]
pub struct ImportCommandHandler {}

impl ImportCommandHandler {
    /// 新しいImportCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// importコマンドを実行
    pub async fn execute(&self, command: &ImportCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        let target = context.target_adapter()?;
        let cancel = context.cancellation_token();
        let interpreter =
            ScriptInterpreter::for_dialect(target.dialect(), command.terminator.into());

        let statements = interpreter
            .execute_file(&command.input, target.as_ref(), &cancel)
            .await
            .with_context(|| format!("Failed to import script: {:?}", command.input))?;

        let input_path = command.input.display().to_string();
        let text_message = format!(
            "{} {} statements from {}",
            "Imported".green().bold(),
            statements,
            input_path
        );

        let output = ImportOutput {
            input_path,
            statements,
            text_message,
        };
        render_output(&output, &command.format)
    }
}
