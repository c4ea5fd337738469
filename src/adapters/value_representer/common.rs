// 値表現の共通ロジック
//
// 数値・日時のインバリアントな書式、カラム型への値の変換、テキストからの値の復元を提供します。

use crate::core::error::TranslationError;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag};
use crate::core::value::SqlValue;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

/// NULLリテラル
pub const NULL_LITERAL: &str = "NULL";

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f %#z",
    "%Y-%m-%d %H:%M%#z",
];

/// シングルクォートを二重化して囲む
pub fn quote_doubled(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// 固定小数点数（末尾の0を除去）
pub fn format_decimal(value: &Decimal) -> String {
    value.normalize().to_string()
}

/// 有限の浮動小数点数（指数表記なし、末尾の0なし）
pub fn format_float(value: f64) -> String {
    format!("{}", value)
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// 時刻（秒の端数がない場合は秒まで、ある場合はマイクロ秒までで末尾の0を除去）
pub fn format_time(value: &NaiveTime) -> String {
    let base = value.format("%H:%M:%S").to_string();
    let micros = value.nanosecond() / 1_000;
    if micros == 0 {
        base
    } else {
        let fraction = format!("{:06}", micros);
        format!("{}.{}", base, fraction.trim_end_matches('0'))
    }
}

/// 日時（時刻が0時ちょうどの場合は日付のみ）
pub fn format_datetime(value: &NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        format_date(&value.date())
    } else {
        format!("{} {}", format_date(&value.date()), format_time(&value.time()))
    }
}

/// オフセット付き日時（オフセットは常に明示）
pub fn format_datetime_offset(value: &DateTime<FixedOffset>) -> String {
    let local = value.naive_local();
    format!(
        "{} {}{}",
        format_date(&local.date()),
        format_time(&local.time()),
        value.format("%:z")
    )
}

/// 値のテキスト表現（クォートなし）
///
/// 文字列型カラムへの変換と、parse_text との往復に使用します。
pub fn plain_text(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Float(f) => format_float(*f),
        SqlValue::Decimal(d) => format_decimal(d),
        SqlValue::Text(t) => t.clone(),
        SqlValue::Bytes(b) => format!("\\x{}", hex::encode(b)),
        SqlValue::Guid(u) => u.hyphenated().to_string(),
        SqlValue::Date(d) => format_date(d),
        SqlValue::Time(t) => format_time(t),
        SqlValue::DateTime(dt) => format_datetime(dt),
        SqlValue::DateTimeOffset(dt) => format_datetime_offset(dt),
    }
}

/// 値をカラム型に合わせて変換
///
/// 変換できない組み合わせの場合はNoneを返します。
pub fn coerce(value: &SqlValue, data_type: &DataTypeDescriptor) -> Option<SqlValue> {
    if value.is_null() {
        return Some(SqlValue::Null);
    }

    let tag = data_type.tag();
    match tag {
        DataTypeTag::Boolean => match value {
            SqlValue::Bool(b) => Some(SqlValue::Bool(*b)),
            SqlValue::Int(i) => Some(SqlValue::Bool(*i != 0)),
            SqlValue::Float(f) => Some(SqlValue::Bool(*f != 0.0)),
            SqlValue::Decimal(d) => Some(SqlValue::Bool(!d.is_zero())),
            SqlValue::Text(t) => parse_bool(t).map(SqlValue::Bool),
            _ => None,
        },
        DataTypeTag::SmallInt | DataTypeTag::Integer | DataTypeTag::BigInt => match value {
            SqlValue::Int(i) => Some(SqlValue::Int(*i)),
            SqlValue::Bool(b) => Some(SqlValue::Int(i64::from(*b))),
            SqlValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                f.to_i64().map(SqlValue::Int)
            }
            SqlValue::Decimal(d) if d.fract().is_zero() => d.to_i64().map(SqlValue::Int),
            SqlValue::Text(t) => t.trim().parse::<i64>().ok().map(SqlValue::Int),
            _ => None,
        },
        DataTypeTag::Real | DataTypeTag::Double => match value {
            SqlValue::Float(f) => Some(SqlValue::Float(*f)),
            SqlValue::Int(i) => Some(SqlValue::Float(*i as f64)),
            SqlValue::Bool(b) => Some(SqlValue::Float(if *b { 1.0 } else { 0.0 })),
            SqlValue::Decimal(d) => d.to_f64().map(SqlValue::Float),
            SqlValue::Text(t) => t.trim().parse::<f64>().ok().map(SqlValue::Float),
            _ => None,
        },
        DataTypeTag::Decimal => match value {
            SqlValue::Decimal(d) => Some(SqlValue::Decimal(*d)),
            SqlValue::Int(i) => Some(SqlValue::Decimal(Decimal::from(*i))),
            SqlValue::Bool(b) => Some(SqlValue::Decimal(Decimal::from(i64::from(*b)))),
            SqlValue::Float(f) => Decimal::from_f64(*f).map(SqlValue::Decimal),
            SqlValue::Text(t) => parse_decimal(t).map(SqlValue::Decimal),
            _ => None,
        },
        DataTypeTag::Char | DataTypeTag::Varchar | DataTypeTag::Text | DataTypeTag::Json => {
            match value {
                SqlValue::Text(t) => Some(SqlValue::Text(t.clone())),
                SqlValue::Bytes(b) => String::from_utf8(b.clone()).ok().map(SqlValue::Text),
                other => Some(SqlValue::Text(plain_text(other))),
            }
        }
        DataTypeTag::Binary | DataTypeTag::Varbinary | DataTypeTag::Blob => match value {
            SqlValue::Bytes(b) => Some(SqlValue::Bytes(b.clone())),
            SqlValue::Text(t) => Some(SqlValue::Bytes(t.as_bytes().to_vec())),
            SqlValue::Guid(u) => Some(SqlValue::Bytes(u.as_bytes().to_vec())),
            _ => None,
        },
        DataTypeTag::Date => match value {
            SqlValue::Date(d) => Some(SqlValue::Date(*d)),
            SqlValue::DateTime(dt) => Some(SqlValue::Date(dt.date())),
            SqlValue::DateTimeOffset(dt) => Some(SqlValue::Date(dt.date_naive())),
            SqlValue::Text(t) => parse_date(t).map(SqlValue::Date),
            _ => None,
        },
        DataTypeTag::Time => match value {
            SqlValue::Time(t) => Some(SqlValue::Time(*t)),
            SqlValue::DateTime(dt) => Some(SqlValue::Time(dt.time())),
            SqlValue::DateTimeOffset(dt) => Some(SqlValue::Time(dt.time())),
            SqlValue::Text(t) => parse_time(t).map(SqlValue::Time),
            _ => None,
        },
        DataTypeTag::DateTime => match value {
            SqlValue::DateTime(dt) => Some(SqlValue::DateTime(*dt)),
            SqlValue::Date(d) => Some(SqlValue::DateTime(d.and_time(NaiveTime::MIN))),
            SqlValue::DateTimeOffset(dt) => Some(SqlValue::DateTime(dt.naive_utc())),
            SqlValue::Text(t) => parse_datetime(t).map(SqlValue::DateTime),
            _ => None,
        },
        DataTypeTag::DateTimeOffset => match value {
            SqlValue::DateTimeOffset(dt) => Some(SqlValue::DateTimeOffset(*dt)),
            SqlValue::DateTime(dt) => Some(SqlValue::DateTimeOffset(dt.and_utc().fixed_offset())),
            SqlValue::Date(d) => Some(SqlValue::DateTimeOffset(
                d.and_time(NaiveTime::MIN).and_utc().fixed_offset(),
            )),
            SqlValue::Text(t) => parse_datetime_offset(t).map(SqlValue::DateTimeOffset),
            _ => None,
        },
        DataTypeTag::Guid => match value {
            SqlValue::Guid(u) => Some(SqlValue::Guid(*u)),
            SqlValue::Text(t) => Uuid::parse_str(t.trim()).ok().map(SqlValue::Guid),
            SqlValue::Bytes(b) => Uuid::from_slice(b).ok().map(SqlValue::Guid),
            _ => None,
        },
    }
}

/// テキストを型付き値へ変換
///
/// # Arguments
///
/// * `text` - エンジンから読み出したテキスト
/// * `data_type` - カラムの共通型
///
/// # Returns
///
/// 型付き値、または変換できない場合は InvalidLiteral エラー
pub fn parse_text(text: &str, data_type: &DataTypeDescriptor) -> Result<SqlValue, TranslationError> {
    let tag = data_type.tag();
    let trimmed = text.trim();

    let parsed = match tag {
        DataTypeTag::Char | DataTypeTag::Varchar | DataTypeTag::Text | DataTypeTag::Json => {
            Some(SqlValue::Text(text.to_string()))
        }
        DataTypeTag::Binary | DataTypeTag::Varbinary | DataTypeTag::Blob => {
            parse_bytes(trimmed).map(SqlValue::Bytes)
        }
        _ => coerce(&SqlValue::Text(trimmed.to_string()), data_type),
    };

    parsed.ok_or_else(|| TranslationError::InvalidLiteral {
        text: text.to_string(),
        data_type: data_type.to_string(),
        reason: format!("cannot be read as {}", tag),
    })
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(trimmed).map(|dt| dt.date()))
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .or_else(|| parse_offset_only(trimmed).map(|dt| dt.naive_local()))
}

/// オフセット付き日時をパース（オフセットがない場合はUTCとみなす）
pub fn parse_datetime_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    parse_offset_only(trimmed).or_else(|| {
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
            .map(|dt| dt.and_utc().fixed_offset())
    })
}

fn parse_offset_only(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(text, format).ok())
    })
}

/// バイナリのテキスト表現をデコード（`\x..` と `0x..` のhex形式に対応）
pub fn parse_bytes(text: &str) -> Option<Vec<u8>> {
    if let Some(hex_text) = text
        .strip_prefix("\\x")
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
    {
        hex::decode(hex_text).ok()
    } else {
        Some(text.as_bytes().to_vec())
    }
}
