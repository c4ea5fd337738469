// SQLite用SQLジェネレーター
//
// 記述子からSQLite用のDDL・DMLを生成します。

use crate::adapters::sql_generator::{ColumnDefinition, SqlGenerator};
use crate::adapters::sql_quote::quote_identifier_sqlite;
use crate::core::config::Dialect;
use crate::core::schema::{ColumnDescriptor, DataTypeTag, ForeignKeyDescriptor, TableDescriptor};

/// SQLite用SQLジェネレーター
#[derive(Debug, Clone, Default)]
pub struct SqliteSqlGenerator {}

impl SqliteSqlGenerator {
    /// 新しいSqliteSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }

    /// `INTEGER PRIMARY KEY AUTOINCREMENT` として宣言できるカラムかどうか
    ///
    /// 自動増分は単一カラムのプライマリキーでのみ使用できます。
    fn is_rowid_alias(column: &ColumnDefinition, table: &TableDescriptor) -> bool {
        column.identity && table.primary_key.len() == 1 && table.primary_key[0] == column.name
    }
}

impl SqlGenerator for SqliteSqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn generate_column_definition(
        &self,
        column: &ColumnDefinition,
        table: &TableDescriptor,
    ) -> String {
        let name = quote_identifier_sqlite(&column.name);
        if Self::is_rowid_alias(column, table) {
            return format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", name);
        }

        let mut parts = vec![name, column.native_type.clone()];

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", default));
        }

        parts.join(" ")
    }

    fn declares_inline_primary_key(
        &self,
        columns: &[ColumnDefinition],
        table: &TableDescriptor,
    ) -> bool {
        columns.iter().any(|c| Self::is_rowid_alias(c, table))
    }

    /// SQLiteは ALTER TABLE ADD CONSTRAINT をサポートしない
    fn generate_add_foreign_key(
        &self,
        _table: &TableDescriptor,
        _foreign_key: &ForeignKeyDescriptor,
    ) -> Option<String> {
        None
    }

    fn read_expression(&self, column: &ColumnDescriptor) -> String {
        let name = quote_identifier_sqlite(&column.name);
        match column.data_type.tag() {
            DataTypeTag::Boolean
            | DataTypeTag::SmallInt
            | DataTypeTag::Integer
            | DataTypeTag::BigInt
            | DataTypeTag::Binary
            | DataTypeTag::Varbinary
            | DataTypeTag::Blob => name,
            DataTypeTag::Real | DataTypeTag::Double => format!("CAST({} AS REAL)", name),
            _ => format!("CAST({} AS TEXT)", name),
        }
    }
}
