// SQLite用値表現

use super::common::{
    format_date, format_datetime, format_datetime_offset, format_decimal, format_float,
    format_time, quote_doubled, NULL_LITERAL,
};
use super::ValueRepresenter;
use crate::core::config::Dialect;
use crate::core::value::SqlValue;

/// SQLite用値表現
pub struct SqliteValueRepresenter;

impl SqliteValueRepresenter {
    fn float_literal(value: f64) -> String {
        if value.is_nan() {
            NULL_LITERAL.to_string()
        } else if value.is_infinite() {
            // 範囲外の数値リテラルはSQLiteでInfとして扱われる
            String::from(if value > 0.0 { "9e999" } else { "-9e999" })
        } else {
            format_float(value)
        }
    }
}

impl ValueRepresenter for SqliteValueRepresenter {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => NULL_LITERAL.to_string(),
            SqlValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => Self::float_literal(*f),
            SqlValue::Decimal(d) => format_decimal(d),
            SqlValue::Text(t) => quote_doubled(t),
            SqlValue::Bytes(b) => format!("X'{}'", hex::encode(b)),
            SqlValue::Guid(u) => format!("'{}'", u.hyphenated()),
            SqlValue::Date(d) => format!("'{}'", format_date(d)),
            SqlValue::Time(t) => format!("'{}'", format_time(t)),
            SqlValue::DateTime(dt) => format!("'{}'", format_datetime(dt)),
            SqlValue::DateTimeOffset(dt) => format!("'{}'", format_datetime_offset(dt)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::DataTypeDescriptor;

    #[test]
    fn test_sqlite_boolean_literal() {
        let representer = SqliteValueRepresenter;
        assert_eq!(representer.literal(&SqlValue::Bool(true)), "1");
        assert_eq!(
            representer.represent_typed(&SqlValue::Int(0), &DataTypeDescriptor::boolean()),
            "0"
        );
    }

    #[test]
    fn test_sqlite_string_quote_doubling() {
        let representer = SqliteValueRepresenter;
        assert_eq!(
            representer.literal(&SqlValue::from("a'b\nc")),
            "'a''b\nc'"
        );
    }

    #[test]
    fn test_sqlite_infinite_float() {
        let representer = SqliteValueRepresenter;
        assert_eq!(representer.literal(&SqlValue::Float(f64::INFINITY)), "9e999");
        assert_eq!(representer.literal(&SqlValue::Float(f64::NAN)), "NULL");
    }
}
