// SQL識別子クォートユーティリティ
//
// 各データベース方言用の識別子クォート関数を提供します。
// sql_generator・database_introspector・engine_adapter から使用される共有モジュールです。

use crate::core::config::Dialect;

/// PostgreSQL用識別子クォート（ダブルクォート）
///
/// 識別子内のダブルクォートは二重にエスケープします。
pub fn quote_identifier_postgres(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// MySQL用識別子クォート（バッククォート）
///
/// 識別子内のバッククォートは二重にエスケープします。
pub fn quote_identifier_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// SQLite用識別子クォート（ダブルクォート）
pub fn quote_identifier_sqlite(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// 方言に応じて識別子をクォート
pub fn quote_identifier(dialect: Dialect, name: &str) -> String {
    match dialect {
        Dialect::PostgreSQL => quote_identifier_postgres(name),
        Dialect::MySQL => quote_identifier_mysql(name),
        Dialect::SQLite => quote_identifier_sqlite(name),
    }
}

/// スキーマ修飾付きのテーブル名
///
/// スキーマを持たない方言ではスキーマ名を無視します。
pub fn qualified_name(dialect: Dialect, schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) if dialect.supports_schemas() => format!(
            "{}.{}",
            quote_identifier(dialect, schema),
            quote_identifier(dialect, name)
        ),
        _ => quote_identifier(dialect, name),
    }
}

/// カラム名リストをクォートしてカンマ区切りで結合
pub fn quote_columns(dialect: Dialect, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(dialect, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 文字列リテラルとしてクォート（シングルクォートを二重化）
///
/// イントロスペクション用のクエリ組み立てに使用します。値の表現には value_representer を使用してください。
pub fn quote_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_postgres_with_embedded_quote() {
        assert_eq!(quote_identifier_postgres(r#"table"name"#), r#""table""name""#);
        assert_eq!(quote_identifier_postgres(""), r#""""#);
    }

    #[test]
    fn test_quote_identifier_mysql_with_embedded_backtick() {
        assert_eq!(quote_identifier_mysql("table`name"), "`table``name`");
        assert_eq!(quote_identifier_mysql(r#"table"name"#), r#"`table"name`"#);
    }

    #[test]
    fn test_quote_identifier_sqlite_reserved_word() {
        assert_eq!(quote_identifier_sqlite("order"), r#""order""#);
    }

    #[test]
    fn test_qualified_name_postgres() {
        assert_eq!(
            qualified_name(Dialect::PostgreSQL, Some("sales"), "orders"),
            r#""sales"."orders""#
        );
    }

    #[test]
    fn test_qualified_name_ignores_schema_without_support() {
        assert_eq!(
            qualified_name(Dialect::MySQL, Some("sales"), "orders"),
            "`orders`"
        );
        assert_eq!(
            qualified_name(Dialect::SQLite, Some("main"), "orders"),
            r#""orders""#
        );
    }

    #[test]
    fn test_quote_columns() {
        let columns = vec!["id".to_string(), "name".to_string()];
        assert_eq!(quote_columns(Dialect::MySQL, &columns), "`id`, `name`");
        assert_eq!(quote_columns(Dialect::PostgreSQL, &[]), "");
    }

    #[test]
    fn test_quote_string_literal() {
        assert_eq!(quote_string_literal("O'Brien"), "'O''Brien'");
    }
}
