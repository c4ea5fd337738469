// 値表現サービス
//
// SqlValue をエンジン固有のSQLリテラルへ変換し、
// エンジンから読み出したテキストを SqlValue へ戻す双方向の変換を提供します。

pub mod common;
mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlValueRepresenter;
pub use postgres::PostgresValueRepresenter;
pub use sqlite::SqliteValueRepresenter;

use crate::core::config::Dialect;
use crate::core::error::TranslationError;
use crate::core::schema::DataTypeDescriptor;
use crate::core::value::SqlValue;
use std::sync::Arc;

/// 値表現トレイト
///
/// 各方言ごとに1つの実装を持ちます。
pub trait ValueRepresenter: Send + Sync {
    /// 対象の方言
    fn dialect(&self) -> Dialect;

    /// INSERT文などで使用するプレーンなリテラル
    fn literal(&self, value: &SqlValue) -> String;

    /// 型に依存しない表現
    ///
    /// 値の種類だけで型が決まらない場合はエンジン固有のキャスト注釈を付与することがあります。
    fn represent(&self, value: &SqlValue) -> String {
        self.literal(value)
    }

    /// カラム型に合わせて値を変換してからリテラル化
    ///
    /// 変換できない値は元の値のままリテラル化します。
    fn represent_typed(&self, value: &SqlValue, data_type: &DataTypeDescriptor) -> String {
        match common::coerce(value, data_type) {
            Some(coerced) => self.literal(&coerced),
            None => self.literal(value),
        }
    }

    /// エンジンから読み出したテキストを型付き値へ変換
    fn parse_text(
        &self,
        text: &str,
        data_type: &DataTypeDescriptor,
    ) -> Result<SqlValue, TranslationError> {
        common::parse_text(text, data_type)
    }
}

/// 方言に応じた値表現を作成
pub fn create_representer(dialect: Dialect) -> Arc<dyn ValueRepresenter> {
    match dialect {
        Dialect::PostgreSQL => Arc::new(PostgresValueRepresenter),
        Dialect::MySQL => Arc::new(MySqlValueRepresenter),
        Dialect::SQLite => Arc::new(SqliteValueRepresenter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_representer_dialect() {
        for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
            assert_eq!(create_representer(dialect).dialect(), dialect);
        }
    }

    #[test]
    fn test_null_literal_for_every_dialect() {
        for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
            let representer = create_representer(dialect);
            assert_eq!(representer.represent(&SqlValue::Null), "NULL");
            assert_eq!(
                representer.represent_typed(&SqlValue::Null, &DataTypeDescriptor::integer()),
                "NULL"
            );
        }
    }
}
