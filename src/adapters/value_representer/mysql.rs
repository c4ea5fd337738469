// MySQL用値表現

use super::common::{
    format_date, format_datetime, format_decimal, format_float, format_time, NULL_LITERAL,
};
use super::ValueRepresenter;
use crate::core::config::Dialect;
use crate::core::error::TranslationError;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag};
use crate::core::value::SqlValue;

/// 文字列リテラルの置換テーブル
const ESCAPES: [(char, &str); 9] = [
    ('\0', "\\0"),
    ('\'', "\\'"),
    ('"', "\\\""),
    ('\u{08}', "\\b"),
    ('\n', "\\n"),
    ('\r', "\\r"),
    ('\t', "\\t"),
    ('\u{1a}', "\\Z"),
    ('\\', "\\\\"),
];

/// MySQL用値表現
///
/// MySQLはオフセット付き日時型を持たないため、オフセット付きの値はUTCに変換して表現します。
pub struct MySqlValueRepresenter;

impl MySqlValueRepresenter {
    /// 文字列リテラル（バックスラッシュエスケープ）
    pub fn string_literal(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len() + 2);
        escaped.push('\'');
        for c in text.chars() {
            match ESCAPES.iter().find(|(from, _)| *from == c) {
                Some((_, to)) => escaped.push_str(to),
                None => escaped.push(c),
            }
        }
        escaped.push('\'');
        escaped
    }
}

impl ValueRepresenter for MySqlValueRepresenter {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => NULL_LITERAL.to_string(),
            SqlValue::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
            SqlValue::Int(i) => i.to_string(),
            // MySQLは非有限の浮動小数点数を格納できない
            SqlValue::Float(f) if !f.is_finite() => NULL_LITERAL.to_string(),
            SqlValue::Float(f) => format_float(*f),
            SqlValue::Decimal(d) => format_decimal(d),
            SqlValue::Text(t) => Self::string_literal(t),
            SqlValue::Bytes(b) => format!("X'{}'", hex::encode(b)),
            SqlValue::Guid(u) => format!("'{}'", u.hyphenated()),
            SqlValue::Date(d) => format!("'{}'", format_date(d)),
            SqlValue::Time(t) => format!("'{}'", format_time(t)),
            SqlValue::DateTime(dt) => format!("'{}'", format_datetime(dt)),
            SqlValue::DateTimeOffset(dt) => format!("'{}'", format_datetime(&dt.naive_utc())),
        }
    }

    fn parse_text(
        &self,
        text: &str,
        data_type: &DataTypeDescriptor,
    ) -> Result<SqlValue, TranslationError> {
        // ゼロ日付はNULLとして扱う
        if matches!(
            data_type.tag(),
            DataTypeTag::Date | DataTypeTag::DateTime | DataTypeTag::DateTimeOffset
        ) && text.trim_start().starts_with("0000-00-00")
        {
            return Ok(SqlValue::Null);
        }
        super::common::parse_text(text, data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_mysql_string_literal_escape_table() {
        assert_eq!(
            MySqlValueRepresenter::string_literal("it's \"q\"\n\\\u{1a}"),
            "'it\\'s \\\"q\\\"\\n\\\\\\Z'"
        );
    }

    #[test]
    fn test_mysql_binary_literal() {
        let representer = MySqlValueRepresenter;
        assert_eq!(representer.literal(&SqlValue::Bytes(vec![1, 2, 255])), "X'0102ff'");
    }

    #[test]
    fn test_mysql_offset_converted_to_utc() {
        let representer = MySqlValueRepresenter;
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let value = offset.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        assert_eq!(
            representer.literal(&SqlValue::DateTimeOffset(value)),
            "'2024-01-02'"
        );
    }

    #[test]
    fn test_mysql_zero_date_is_null() {
        let representer = MySqlValueRepresenter;
        let data_type = DataTypeDescriptor::scalar(DataTypeTag::DateTime).unwrap();
        assert_eq!(
            representer.parse_text("0000-00-00 00:00:00", &data_type).unwrap(),
            SqlValue::Null
        );
    }

    #[test]
    fn test_mysql_non_finite_float_is_null() {
        let representer = MySqlValueRepresenter;
        assert_eq!(representer.literal(&SqlValue::Float(f64::INFINITY)), "NULL");
    }
}
