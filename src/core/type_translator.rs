// 共通型テキストの変換
//
// "name", "name(n)", "name(n,m)" 形式の共通型テキストと DataTypeDescriptor を相互変換します。

use crate::core::error::TypeParseError;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag};
use regex::Regex;
use std::sync::LazyLock;

static TYPE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?$")
        .expect("valid regex")
});

/// 共通型テキスト変換
pub struct TypeTranslator;

impl TypeTranslator {
    /// 共通型テキストをパース
    ///
    /// 前後および括弧内の空白は無視されます。型名は大文字小文字を区別しません。
    ///
    /// # Arguments
    ///
    /// * `text` - 共通型テキスト（例: "varchar(10)"）
    ///
    /// # Returns
    ///
    /// データ型記述子、または形式不正・未知の型・引数不一致のエラー
    pub fn parse(text: &str) -> Result<DataTypeDescriptor, TypeParseError> {
        let trimmed = text.trim();
        let captures = TYPE_TEXT
            .captures(trimmed)
            .ok_or_else(|| TypeParseError::Malformed {
                text: text.to_string(),
            })?;

        let name = &captures[1];
        let tag = DataTypeTag::from_name(name).ok_or_else(|| TypeParseError::UnknownType {
            name: name.to_string(),
            text: text.to_string(),
        })?;

        let mut args = Vec::with_capacity(2);
        for group in [2, 3] {
            if let Some(m) = captures.get(group) {
                let arg = m.as_str().parse::<u32>().map_err(|_| TypeParseError::Malformed {
                    text: text.to_string(),
                })?;
                args.push(arg);
            }
        }

        DataTypeDescriptor::new(tag, &args).map_err(|e| match e {
            TypeParseError::ArgumentMismatch {
                tag,
                expected,
                actual,
                ..
            } => TypeParseError::ArgumentMismatch {
                tag,
                expected,
                actual,
                text: text.to_string(),
            },
            other => other,
        })
    }

    /// データ型記述子を共通型テキストに変換
    pub fn format(data_type: &DataTypeDescriptor) -> String {
        data_type.to_string()
    }
}
