// PostgreSQL用型マッパー

use super::common::format_common_sql_type;
use super::TypeMapper;
use super::TypeMetadata;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag};

/// 精度指定のないnumericの既定値
const UNBOUNDED_NUMERIC: (u32, u32) = (38, 10);

/// PostgreSQL用型マッパー
pub struct PostgresTypeMapper;

impl TypeMapper for PostgresTypeMapper {
    fn parse_native_type(
        &self,
        native_type: &str,
        metadata: &TypeMetadata,
    ) -> Option<DataTypeDescriptor> {
        let scalar = |tag| DataTypeDescriptor::scalar(tag).ok();

        match native_type.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => scalar(DataTypeTag::Boolean),
            "smallint" | "int2" => scalar(DataTypeTag::SmallInt),
            "integer" | "int" | "int4" => scalar(DataTypeTag::Integer),
            "bigint" | "int8" => scalar(DataTypeTag::BigInt),
            "real" | "float4" => scalar(DataTypeTag::Real),
            "double precision" | "float8" => scalar(DataTypeTag::Double),
            "numeric" | "decimal" => {
                let (precision, scale) = match metadata.numeric_precision {
                    Some(precision) => (precision, metadata.numeric_scale.unwrap_or(0)),
                    None => UNBOUNDED_NUMERIC,
                };
                Some(DataTypeDescriptor::decimal(precision, scale))
            }
            "character" | "char" | "bpchar" => {
                DataTypeDescriptor::new(DataTypeTag::Char, &[metadata.char_max_length.unwrap_or(1)])
                    .ok()
            }
            "character varying" | "varchar" => match metadata.char_max_length {
                Some(length) => Some(DataTypeDescriptor::varchar(length)),
                None => scalar(DataTypeTag::Text),
            },
            "text" | "citext" | "name" => scalar(DataTypeTag::Text),
            "bytea" => scalar(DataTypeTag::Blob),
            "date" => scalar(DataTypeTag::Date),
            "time" | "time without time zone" => scalar(DataTypeTag::Time),
            "timestamp" | "timestamp without time zone" => scalar(DataTypeTag::DateTime),
            "timestamptz" | "timestamp with time zone" => scalar(DataTypeTag::DateTimeOffset),
            "uuid" => scalar(DataTypeTag::Guid),
            "json" | "jsonb" => scalar(DataTypeTag::Json),
            _ => None,
        }
    }

    fn format_native_type(&self, data_type: &DataTypeDescriptor) -> String {
        if let Some(sql) = format_common_sql_type(data_type) {
            return sql;
        }

        match data_type.tag() {
            DataTypeTag::Boolean => "BOOLEAN".to_string(),
            DataTypeTag::Integer => "INTEGER".to_string(),
            DataTypeTag::Real => "REAL".to_string(),
            DataTypeTag::Double => "DOUBLE PRECISION".to_string(),
            DataTypeTag::Decimal => format!(
                "NUMERIC({}, {})",
                data_type.arg1().unwrap_or(UNBOUNDED_NUMERIC.0),
                data_type.arg2().unwrap_or(0)
            ),
            DataTypeTag::Binary | DataTypeTag::Varbinary | DataTypeTag::Blob => {
                "BYTEA".to_string()
            }
            DataTypeTag::Time => "TIME".to_string(),
            DataTypeTag::DateTime => "TIMESTAMP".to_string(),
            DataTypeTag::DateTimeOffset => "TIMESTAMP WITH TIME ZONE".to_string(),
            DataTypeTag::Guid => "UUID".to_string(),
            // 共通型はformat_common_sql_typeで処理済み
            _ => "TEXT".to_string(),
        }
    }
}
