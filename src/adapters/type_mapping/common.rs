// 共通型フォーマットロジック
//
// 複数の方言で共通する 共通型 -> ネイティブ型文字列 の変換と、
// 宣言型テキスト（"VARCHAR(10)" 等）の分解を提供します。

use crate::core::schema::{DataTypeDescriptor, DataTypeTag};
use regex::Regex;
use std::sync::LazyLock;

static DECLARED_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_ ]*?)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?\s*(?:unsigned|UNSIGNED)?\s*$")
        .expect("valid regex")
});

/// 共通SQL型のフォーマット
///
/// 複数の方言で同一の出力となる型変換を行います。
/// 方言固有の変換が必要な場合は `None` を返します。
pub fn format_common_sql_type(data_type: &DataTypeDescriptor) -> Option<String> {
    let arg1 = data_type.arg1().unwrap_or(0);
    match data_type.tag() {
        DataTypeTag::SmallInt => Some("SMALLINT".to_string()),
        DataTypeTag::BigInt => Some("BIGINT".to_string()),
        DataTypeTag::Char => Some(format!("CHAR({})", arg1)),
        DataTypeTag::Varchar => Some(format!("VARCHAR({})", arg1)),
        DataTypeTag::Date => Some("DATE".to_string()),
        DataTypeTag::Json => Some("JSON".to_string()),
        _ => None,
    }
}

/// 宣言型テキストを型名と引数に分解
///
/// `"VARCHAR(10)"` -> `("varchar", [10])`、`"decimal(10, 2)"` -> `("decimal", [10, 2])`
pub fn split_declared_type(declared: &str) -> Option<(String, Vec<u32>)> {
    let captures = DECLARED_TYPE.captures(declared)?;
    let name = captures[1].trim().to_ascii_lowercase();
    let args = [2, 3]
        .iter()
        .filter_map(|group| captures.get(*group))
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .collect();
    Some((name, args))
}
