// PostgreSQL用SQLジェネレーター
//
// 記述子からPostgreSQL用のDDL・DMLを生成します。

use crate::adapters::sql_generator::{ColumnDefinition, SqlGenerator};
use crate::adapters::sql_quote::{quote_identifier_postgres, quote_string_literal};
use crate::core::config::Dialect;
use crate::core::schema::{ColumnDescriptor, DataTypeTag, SchemaDescriptor, TableDescriptor};

/// PostgreSQL用SQLジェネレーター
#[derive(Debug, Clone, Default)]
pub struct PostgresSqlGenerator {}

impl PostgresSqlGenerator {
    /// 新しいPostgresSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlGenerator for PostgresSqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    fn generate_create_schema(&self, schema: &SchemaDescriptor) -> Option<String> {
        Some(format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            quote_identifier_postgres(&schema.name)
        ))
    }

    fn generate_column_definition(
        &self,
        column: &ColumnDefinition,
        _table: &TableDescriptor,
    ) -> String {
        let mut parts = vec![quote_identifier_postgres(&column.name), column.native_type.clone()];

        if column.identity {
            parts.push("GENERATED BY DEFAULT AS IDENTITY".to_string());
        } else if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", default));
        }

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        parts.join(" ")
    }

    fn generate_identity_reset(
        &self,
        table: &TableDescriptor,
        column: &ColumnDescriptor,
    ) -> Option<String> {
        let table_name = self.table_name(table);
        let column_name = quote_identifier_postgres(&column.name);
        Some(format!(
            "SELECT setval(pg_get_serial_sequence({}, {}), COALESCE(MAX({}), 0) + 1, false) FROM {}",
            quote_string_literal(&table_name),
            quote_string_literal(&column.name),
            column_name,
            table_name
        ))
    }

    fn read_expression(&self, column: &ColumnDescriptor) -> String {
        let name = quote_identifier_postgres(&column.name);
        match column.data_type.tag() {
            DataTypeTag::SmallInt | DataTypeTag::Integer | DataTypeTag::BigInt => {
                format!("{}::int8", name)
            }
            DataTypeTag::Real | DataTypeTag::Double => format!("{}::float8", name),
            DataTypeTag::Boolean
            | DataTypeTag::Binary
            | DataTypeTag::Varbinary
            | DataTypeTag::Blob => name,
            _ => format!("{}::text", name),
        }
    }

    fn generate_create_database(&self, name: &str) -> Option<String> {
        Some(format!("CREATE DATABASE {}", quote_identifier_postgres(name)))
    }

    fn generate_drop_database_if_exists(&self, name: &str) -> Option<String> {
        Some(format!(
            "DROP DATABASE IF EXISTS {}",
            quote_identifier_postgres(name)
        ))
    }
}
