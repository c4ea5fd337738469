// inspectコマンドハンドラー
//
// 移行元のデータベース構造（DatabaseDescriptor）をJSONで出力します。

use crate::cli::command_context::CommandContext;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// inspectコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct InspectCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
}

/// inspectコマンドハンドラー
#[derive(Debug, Default)]
pub struct InspectCommandHandler {}

impl InspectCommandHandler {
    /// 新しいInspectCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// inspectコマンドを実行
    ///
    /// 出力フォーマットにかかわらず、記述子をJSONとして返します。
    pub async fn execute(&self, command: &InspectCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;

        let source = context.source_adapter()?;
        let cancel = context.cancellation_token();
        let database = source
            .get_database_descriptor(&cancel)
            .await
            .with_context(|| "Failed to read source database structure")?;

        serde_json::to_string_pretty(&database)
            .with_context(|| "Failed to serialize database structure to JSON")
    }
}
