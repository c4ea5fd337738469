// SQLite用型マッパー
//
// SQLiteは宣言型をそのまま保持するため、共通型の名前をほぼそのまま宣言型として使用します。

use super::common::split_declared_type;
use super::TypeMapper;
use super::TypeMetadata;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag};

/// SQLite用型マッパー
pub struct SqliteTypeMapper;

impl TypeMapper for SqliteTypeMapper {
    fn parse_native_type(
        &self,
        native_type: &str,
        _metadata: &TypeMetadata,
    ) -> Option<DataTypeDescriptor> {
        let (name, args) = split_declared_type(native_type)?;

        let tag = match name.as_str() {
            "boolean" | "bool" => DataTypeTag::Boolean,
            "smallint" | "tinyint" => DataTypeTag::SmallInt,
            "integer" | "int" | "mediumint" => DataTypeTag::Integer,
            "bigint" => DataTypeTag::BigInt,
            "real" => DataTypeTag::Real,
            "double" | "double precision" | "float" => DataTypeTag::Double,
            "decimal" | "numeric" => {
                return Some(match args.as_slice() {
                    [precision, scale] => DataTypeDescriptor::decimal(*precision, *scale),
                    [precision] => DataTypeDescriptor::decimal(*precision, 0),
                    _ => DataTypeDescriptor::decimal(38, 10),
                });
            }
            "char" | "character" | "nchar" => DataTypeTag::Char,
            "varchar" | "character varying" | "nvarchar" => DataTypeTag::Varchar,
            "text" | "clob" => DataTypeTag::Text,
            "binary" => DataTypeTag::Binary,
            "varbinary" => DataTypeTag::Varbinary,
            "blob" => DataTypeTag::Blob,
            "date" => DataTypeTag::Date,
            "time" => DataTypeTag::Time,
            "datetime" | "timestamp" => DataTypeTag::DateTime,
            "datetimeoffset" | "timestamptz" => DataTypeTag::DateTimeOffset,
            "guid" | "uuid" => DataTypeTag::Guid,
            "json" => DataTypeTag::Json,
            _ => return None,
        };

        // 長さ指定のない文字列/バイナリ型は無制限型として扱う
        match (tag.arity(), args.len()) {
            (1, 0) if tag.is_textual() => DataTypeDescriptor::scalar(DataTypeTag::Text).ok(),
            (1, 0) => DataTypeDescriptor::scalar(DataTypeTag::Blob).ok(),
            (0, _) => DataTypeDescriptor::scalar(tag).ok(),
            _ => DataTypeDescriptor::new(tag, &args).ok(),
        }
    }

    fn format_native_type(&self, data_type: &DataTypeDescriptor) -> String {
        data_type.to_string().to_ascii_uppercase()
    }

    /// SQLiteのCASTはストレージクラスのみ意味を持つ
    fn cast_type(&self, data_type: &DataTypeDescriptor) -> String {
        let tag = data_type.tag();
        let storage_class = if tag.is_integer() || tag == DataTypeTag::Boolean {
            "INTEGER"
        } else if matches!(tag, DataTypeTag::Real | DataTypeTag::Double) {
            "REAL"
        } else if tag == DataTypeTag::Decimal {
            "NUMERIC"
        } else if tag.is_binary() {
            "BLOB"
        } else {
            "TEXT"
        };
        storage_class.to_string()
    }
}
