// SQL生成アダプター
//
// 記述子から各データベース方言用のDDL・DMLを生成するアダプター層。
// 型名・デフォルト値式は呼び出し側で方言のテキストへ解決済みの ColumnDefinition として受け取ります。

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::MySqlSqlGenerator;
pub use postgres::PostgresSqlGenerator;
pub use sqlite::SqliteSqlGenerator;

use crate::adapters::sql_quote::{qualified_name, quote_columns, quote_identifier};
use crate::core::config::Dialect;
use crate::core::schema::{
    ColumnDescriptor, DataTypeTag, ForeignKeyDescriptor, IndexDescriptor, SchemaDescriptor,
    TableDescriptor,
};
use crate::core::value::PageInfo;

/// 方言のテキストへ解決済みのカラム定義
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// カラム名
    pub name: String,
    /// ネイティブ型（例: "VARCHAR(10)"）
    pub native_type: String,
    /// NULL許可フラグ
    pub nullable: bool,
    /// デフォルト値式（方言のSQLテキスト）
    pub default: Option<String>,
    /// 自動増分フラグ
    pub identity: bool,
}

/// SQLジェネレータートレイト
///
/// 各データベース方言用のSQLジェネレーターが実装すべきインターフェース。
pub trait SqlGenerator: Send + Sync {
    /// 対象の方言
    fn dialect(&self) -> Dialect;

    /// 識別子をクォート
    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier(self.dialect(), name)
    }

    /// スキーマ修飾付きのテーブル名
    fn table_name(&self, table: &TableDescriptor) -> String {
        qualified_name(self.dialect(), table.schema.as_deref(), &table.name)
    }

    /// CREATE SCHEMA文を生成（スキーマを持たない方言ではNone）
    fn generate_create_schema(&self, _schema: &SchemaDescriptor) -> Option<String> {
        None
    }

    /// カラム定義のSQL文字列を生成
    ///
    /// # Arguments
    ///
    /// * `column` - 解決済みのカラム定義
    /// * `table` - 所属するテーブル（インラインのPRIMARY KEY判定に使用）
    fn generate_column_definition(&self, column: &ColumnDefinition, table: &TableDescriptor)
        -> String;

    /// カラム定義内でPRIMARY KEYを宣言済みかどうか
    fn declares_inline_primary_key(
        &self,
        _columns: &[ColumnDefinition],
        _table: &TableDescriptor,
    ) -> bool {
        false
    }

    /// CREATE TABLE文を生成
    ///
    /// プライマリキーはテーブル制約として同時に作成します。
    fn generate_create_table(&self, table: &TableDescriptor, columns: &[ColumnDefinition]) -> String {
        let mut elements: Vec<String> = columns
            .iter()
            .map(|column| format!("    {}", self.generate_column_definition(column, table)))
            .collect();

        if !table.primary_key.is_empty() && !self.declares_inline_primary_key(columns, table) {
            elements.push(format!(
                "    PRIMARY KEY ({})",
                quote_columns(self.dialect(), &table.primary_key)
            ));
        }

        format!(
            "CREATE TABLE {} (\n{}\n)",
            self.table_name(table),
            elements.join(",\n")
        )
    }

    /// CREATE INDEX文を生成
    fn generate_create_index(&self, table: &TableDescriptor, index: &IndexDescriptor) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.quote_identifier(&index.name),
            self.table_name(table),
            quote_columns(self.dialect(), &index.columns)
        )
    }

    /// 外部キー追加のALTER TABLE文を生成（未対応の方言ではNone）
    fn generate_add_foreign_key(
        &self,
        table: &TableDescriptor,
        foreign_key: &ForeignKeyDescriptor,
    ) -> Option<String> {
        let referenced = qualified_name(
            self.dialect(),
            foreign_key.referenced_schema.as_deref(),
            &foreign_key.referenced_table,
        );
        Some(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.table_name(table),
            self.quote_identifier(&foreign_key.name),
            quote_columns(self.dialect(), &foreign_key.columns),
            referenced,
            quote_columns(self.dialect(), &foreign_key.referenced_columns)
        ))
    }

    /// データ投入後に自動増分の次の値を合わせる文（不要な方言ではNone）
    fn generate_identity_reset(
        &self,
        _table: &TableDescriptor,
        _column: &ColumnDescriptor,
    ) -> Option<String> {
        None
    }

    /// 読み出し時のカラム式
    ///
    /// ドライバーが直接扱えない型はテキストへキャストします。
    fn read_expression(&self, column: &ColumnDescriptor) -> String;

    /// COUNT文を生成
    fn generate_count(&self, table: &TableDescriptor) -> String {
        format!("SELECT COUNT(*) FROM {}", self.table_name(table))
    }

    /// ページ単位のSELECT文を生成
    ///
    /// ページ境界を安定させるため、常に `page_order_columns` の順序で並べます。
    fn generate_select_page(&self, table: &TableDescriptor, page: PageInfo) -> String {
        let columns = table
            .columns
            .iter()
            .map(|c| self.read_expression(c))
            .collect::<Vec<_>>()
            .join(", ");

        let order_columns = page_order_columns(table);
        let order_by = if order_columns.is_empty() {
            String::new()
        } else {
            format!(
                " ORDER BY {}",
                quote_columns(self.dialect(), &order_columns)
            )
        };

        format!(
            "SELECT {} FROM {}{} LIMIT {} OFFSET {}",
            columns,
            self.table_name(table),
            order_by,
            page.limit,
            page.offset
        )
    }

    /// 複数行INSERT文を生成
    ///
    /// # Arguments
    ///
    /// * `table` - 対象テーブル
    /// * `columns` - カラム名（行の値と同じ順序）
    /// * `rows` - リテラル化済みの行
    fn generate_insert(
        &self,
        table: &TableDescriptor,
        columns: &[String],
        rows: &[Vec<String>],
    ) -> String {
        let values = rows
            .iter()
            .map(|row| format!("({})", row.join(", ")))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "INSERT INTO {} ({}) VALUES\n{}",
            self.table_name(table),
            quote_columns(self.dialect(), columns),
            values
        )
    }

    /// ダンプ用の1行INSERT文を生成
    fn generate_dump_insert(
        &self,
        table: &TableDescriptor,
        columns: &[String],
        literals: &[String],
    ) -> String {
        format!(
            "INSERT INTO {}({}) VALUES ({});",
            self.table_name(table),
            quote_columns(self.dialect(), columns),
            literals.join(", ")
        )
    }

    /// CREATE DATABASE文（サーバーを持たない方言ではNone）
    fn generate_create_database(&self, _name: &str) -> Option<String> {
        None
    }

    /// DROP DATABASE IF EXISTS文（サーバーを持たない方言ではNone）
    fn generate_drop_database_if_exists(&self, _name: &str) -> Option<String> {
        None
    }
}

/// 方言に応じたSQLジェネレーターを作成
pub fn create_sql_generator(dialect: Dialect) -> Box<dyn SqlGenerator> {
    match dialect {
        Dialect::PostgreSQL => Box::new(PostgresSqlGenerator::new()),
        Dialect::MySQL => Box::new(MySqlSqlGenerator::new()),
        Dialect::SQLite => Box::new(SqliteSqlGenerator::new()),
    }
}

/// ページ読み出しの並び順に使うカラム
///
/// プライマリキー、最初のユニークインデックス、比較可能な全カラムの順に選びます。
/// JSON列は PostgreSQL の json 型に比較演算子がないため除外します。
pub fn page_order_columns(table: &TableDescriptor) -> Vec<String> {
    if !table.primary_key.is_empty() {
        return table.primary_key.clone();
    }

    if let Some(index) = table
        .indexes
        .iter()
        .find(|index| index.unique && !index.columns.is_empty())
    {
        return index.columns.clone();
    }

    table
        .columns
        .iter()
        .filter(|c| c.data_type.tag() != DataTypeTag::Json)
        .map(|c| c.name.clone())
        .collect()
}
