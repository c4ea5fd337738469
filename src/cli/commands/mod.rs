// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod dump;
pub mod import;
pub mod inspect;
pub mod migrate;

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::Serialize;

/// コマンドの出力
///
/// テキスト形式とJSON形式の両方で表示できる出力構造体が実装します。
pub trait CommandOutput: Serialize {
    /// テキスト形式の出力
    fn to_text(&self) -> String;
}

/// 出力フォーマットに応じて出力を描画
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(output.to_text()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).with_context(|| "Failed to serialize output to JSON")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct SampleOutput {
        rows: u64,
        #[serde(skip)]
        text_message: String,
    }

    impl CommandOutput for SampleOutput {
        fn to_text(&self) -> String {
            self.text_message.clone()
        }
    }

    #[test]
    fn test_render_output_formats() {
        let output = SampleOutput {
            rows: 3,
            text_message: "3 rows".to_string(),
        };
        assert_eq!(render_output(&output, &OutputFormat::Text).unwrap(), "3 rows");
        let json = render_output(&output, &OutputFormat::Json).unwrap();
        assert!(json.contains("\"rows\": 3"));
        assert!(!json.contains("text_message"));
    }
}
