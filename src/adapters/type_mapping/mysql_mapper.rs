// MySQL用型マッパー

use super::common::{format_common_sql_type, split_declared_type};
use super::TypeMapper;
use super::TypeMetadata;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag};

/// MySQL用型マッパー
pub struct MySqlTypeMapper;

impl MySqlTypeMapper {
    // tinyint(1) / bit(1) は真偽値として扱う
    fn is_boolean_column(native_type: &str, metadata: &TypeMetadata) -> bool {
        let declared = metadata
            .column_type
            .as_deref()
            .and_then(split_declared_type);
        match declared {
            Some((name, args)) => {
                (name == "tinyint" || name == "bit") && args.as_slice() == [1]
            }
            None => native_type.eq_ignore_ascii_case("bool") || native_type.eq_ignore_ascii_case("boolean"),
        }
    }
}

impl TypeMapper for MySqlTypeMapper {
    fn parse_native_type(
        &self,
        native_type: &str,
        metadata: &TypeMetadata,
    ) -> Option<DataTypeDescriptor> {
        let scalar = |tag| DataTypeDescriptor::scalar(tag).ok();
        let sized = |tag, default: u32| {
            DataTypeDescriptor::new(tag, &[metadata.char_max_length.unwrap_or(default)]).ok()
        };

        if Self::is_boolean_column(native_type, metadata) {
            return scalar(DataTypeTag::Boolean);
        }

        match native_type.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => scalar(DataTypeTag::Boolean),
            "tinyint" | "smallint" | "year" => scalar(DataTypeTag::SmallInt),
            "mediumint" | "int" | "integer" => scalar(DataTypeTag::Integer),
            "bigint" => scalar(DataTypeTag::BigInt),
            "float" => scalar(DataTypeTag::Real),
            "double" | "real" | "double precision" => scalar(DataTypeTag::Double),
            "decimal" | "numeric" => Some(DataTypeDescriptor::decimal(
                metadata.numeric_precision.unwrap_or(10),
                metadata.numeric_scale.unwrap_or(0),
            )),
            "char" => sized(DataTypeTag::Char, 1),
            "varchar" => sized(DataTypeTag::Varchar, 255),
            "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set" => {
                scalar(DataTypeTag::Text)
            }
            "binary" => sized(DataTypeTag::Binary, 1),
            "varbinary" => sized(DataTypeTag::Varbinary, 255),
            "tinyblob" | "blob" | "mediumblob" | "longblob" => scalar(DataTypeTag::Blob),
            "date" => scalar(DataTypeTag::Date),
            "time" => scalar(DataTypeTag::Time),
            "datetime" | "timestamp" => scalar(DataTypeTag::DateTime),
            "json" => scalar(DataTypeTag::Json),
            _ => None,
        }
    }

    fn format_native_type(&self, data_type: &DataTypeDescriptor) -> String {
        if let Some(sql) = format_common_sql_type(data_type) {
            return sql;
        }

        match data_type.tag() {
            DataTypeTag::Boolean => "TINYINT(1)".to_string(),
            DataTypeTag::Integer => "INT".to_string(),
            DataTypeTag::Real => "FLOAT".to_string(),
            DataTypeTag::Double => "DOUBLE".to_string(),
            DataTypeTag::Decimal => format!(
                "DECIMAL({}, {})",
                data_type.arg1().unwrap_or(10),
                data_type.arg2().unwrap_or(0)
            ),
            DataTypeTag::Binary => format!("BINARY({})", data_type.arg1().unwrap_or(1)),
            DataTypeTag::Varbinary => format!("VARBINARY({})", data_type.arg1().unwrap_or(255)),
            DataTypeTag::Blob => "LONGBLOB".to_string(),
            DataTypeTag::Time => "TIME(6)".to_string(),
            // オフセット付き日時はUTCに正規化して格納する
            DataTypeTag::DateTime | DataTypeTag::DateTimeOffset => "DATETIME(6)".to_string(),
            DataTypeTag::Guid => "CHAR(36)".to_string(),
            _ => "LONGTEXT".to_string(),
        }
    }

    /// MySQLのCASTは指定できる型が限られている
    fn cast_type(&self, data_type: &DataTypeDescriptor) -> String {
        match data_type.tag() {
            DataTypeTag::Boolean
            | DataTypeTag::SmallInt
            | DataTypeTag::Integer
            | DataTypeTag::BigInt => "SIGNED".to_string(),
            DataTypeTag::Real | DataTypeTag::Double => "DOUBLE".to_string(),
            DataTypeTag::Decimal => format!(
                "DECIMAL({}, {})",
                data_type.arg1().unwrap_or(10),
                data_type.arg2().unwrap_or(0)
            ),
            DataTypeTag::Binary | DataTypeTag::Varbinary | DataTypeTag::Blob => {
                "BINARY".to_string()
            }
            DataTypeTag::Date => "DATE".to_string(),
            DataTypeTag::Time => "TIME(6)".to_string(),
            DataTypeTag::DateTime | DataTypeTag::DateTimeOffset => "DATETIME(6)".to_string(),
            _ => "CHAR".to_string(),
        }
    }
}
