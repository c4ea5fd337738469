// MySQL用SQLジェネレーター
//
// 記述子からMySQL用のDDL・DMLを生成します。

use crate::adapters::sql_generator::{ColumnDefinition, SqlGenerator};
use crate::adapters::sql_quote::quote_identifier_mysql;
use crate::core::config::Dialect;
use crate::core::schema::{ColumnDescriptor, DataTypeTag, TableDescriptor};

/// MySQL用SQLジェネレーター
#[derive(Debug, Clone, Default)]
pub struct MySqlSqlGenerator {}

impl MySqlSqlGenerator {
    /// 新しいMySqlSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlGenerator for MySqlSqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn generate_column_definition(
        &self,
        column: &ColumnDefinition,
        _table: &TableDescriptor,
    ) -> String {
        let mut parts = vec![quote_identifier_mysql(&column.name), column.native_type.clone()];

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        if column.identity {
            parts.push("AUTO_INCREMENT".to_string());
        } else if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", default));
        }

        parts.join(" ")
    }

    fn read_expression(&self, column: &ColumnDescriptor) -> String {
        let name = quote_identifier_mysql(&column.name);
        match column.data_type.tag() {
            DataTypeTag::Boolean
            | DataTypeTag::SmallInt
            | DataTypeTag::Integer
            | DataTypeTag::BigInt => format!("CAST({} AS SIGNED)", name),
            DataTypeTag::Real | DataTypeTag::Double => format!("CAST({} AS DOUBLE)", name),
            DataTypeTag::Binary | DataTypeTag::Varbinary | DataTypeTag::Blob => name,
            _ => format!("CAST({} AS CHAR)", name),
        }
    }

    fn generate_create_database(&self, name: &str) -> Option<String> {
        Some(format!("CREATE DATABASE {}", quote_identifier_mysql(name)))
    }

    fn generate_drop_database_if_exists(&self, name: &str) -> Option<String> {
        Some(format!("DROP DATABASE IF EXISTS {}", quote_identifier_mysql(name)))
    }
}
