// PostgreSQL用値表現

use super::common::{
    format_date, format_datetime, format_datetime_offset, format_decimal, format_float,
    format_time, quote_doubled, NULL_LITERAL,
};
use super::ValueRepresenter;
use crate::core::config::Dialect;
use crate::core::error::TranslationError;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag};
use crate::core::value::SqlValue;

/// PostgreSQL用値表現
pub struct PostgresValueRepresenter;

impl PostgresValueRepresenter {
    /// 文字列リテラル
    ///
    /// バックスラッシュや制御文字を含む場合は E'' 形式でエスケープします。
    pub fn string_literal(text: &str) -> String {
        let needs_escape = text.chars().any(|c| c == '\\' || c.is_control());
        if !needs_escape {
            return quote_doubled(text);
        }

        let mut escaped = String::with_capacity(text.len() + 8);
        for c in text.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '\'' => escaped.push_str("\\'"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                '\u{08}' => escaped.push_str("\\b"),
                '\u{0c}' => escaped.push_str("\\f"),
                c if c.is_control() && c.is_ascii() => {
                    escaped.push_str(&format!("\\x{:02x}", c as u32))
                }
                // \x はバイト単位なので C1 制御文字はコードポイントで書く
                c if c.is_control() => {
                    escaped.push_str(&format!("\\u{:04x}", c as u32))
                }
                c => escaped.push(c),
            }
        }
        format!("E'{}'", escaped)
    }

    fn float_literal(value: f64) -> String {
        if value.is_nan() {
            "'NaN'".to_string()
        } else if value.is_infinite() {
            if value > 0.0 {
                "'Infinity'".to_string()
            } else {
                "'-Infinity'".to_string()
            }
        } else {
            format_float(value)
        }
    }
}

impl ValueRepresenter for PostgresValueRepresenter {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    fn literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => NULL_LITERAL.to_string(),
            SqlValue::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => Self::float_literal(*f),
            SqlValue::Decimal(d) => format_decimal(d),
            SqlValue::Text(t) => Self::string_literal(t),
            SqlValue::Bytes(b) => format!("'\\x{}'", hex::encode(b)),
            SqlValue::Guid(u) => format!("'{}'", u.hyphenated()),
            SqlValue::Date(d) => format!("'{}'", format_date(d)),
            SqlValue::Time(t) => format!("'{}'", format_time(t)),
            SqlValue::DateTime(dt) => format!("'{}'", format_datetime(dt)),
            SqlValue::DateTimeOffset(dt) => format!("'{}'", format_datetime_offset(dt)),
        }
    }

    fn represent(&self, value: &SqlValue) -> String {
        let literal = self.literal(value);
        match value {
            SqlValue::Bytes(_) => format!("{}::bytea", literal),
            SqlValue::Guid(_) => format!("{}::uuid", literal),
            SqlValue::Date(_) => format!("{}::date", literal),
            SqlValue::Time(_) => format!("{}::time", literal),
            SqlValue::DateTime(_) => format!("{}::timestamp", literal),
            SqlValue::DateTimeOffset(_) => format!("{}::timestamptz", literal),
            _ => literal,
        }
    }

    fn parse_text(
        &self,
        text: &str,
        data_type: &DataTypeDescriptor,
    ) -> Result<SqlValue, TranslationError> {
        // 'infinity' のような特殊な日時は共通型で表現できない
        if matches!(
            data_type.tag(),
            DataTypeTag::Date | DataTypeTag::DateTime | DataTypeTag::DateTimeOffset
        ) && text.trim().trim_start_matches('-').eq_ignore_ascii_case("infinity")
        {
            return Err(TranslationError::InvalidLiteral {
                text: text.to_string(),
                data_type: data_type.to_string(),
                reason: "infinite timestamps are not supported".to_string(),
            });
        }
        super::common::parse_text(text, data_type)
    }
}
