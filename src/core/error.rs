// エラー型定義
//
// 移行エンジン全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、TypeParseError, TranslationError, UnsupportedOperationError,
// DatabaseError, ScriptExecutionError と、それらを束ねる MigrationError を定義します。

use crate::core::config::Dialect;
use thiserror::Error;

/// 型文字列のパースエラー
///
/// 共通型テキスト（例: "decimal(10,3)"）の解析時に発生するエラーを表現します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    /// Malformed type text
    #[error("Malformed type '{text}': expected name, name(n) or name(n,m)")]
    Malformed {
        /// 入力された型文字列
        text: String,
    },

    /// Unknown type name
    #[error("Unknown type '{name}' in '{text}'")]
    UnknownType {
        /// 型名
        name: String,
        /// 入力された型文字列
        text: String,
    },

    /// Argument count does not match the type's arity
    #[error("Argument mismatch for '{tag}' in '{text}': expected {expected} argument(s), got {actual}")]
    ArgumentMismatch {
        /// 型タグ名
        tag: String,
        /// 要求される引数の数
        expected: usize,
        /// 実際の引数の数
        actual: usize,
        /// 入力された型文字列
        text: String,
    },
}

impl TypeParseError {
    /// 形式不正エラーかどうか
    pub fn is_malformed(&self) -> bool {
        matches!(self, TypeParseError::Malformed { .. })
    }

    /// 未知の型エラーかどうか
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, TypeParseError::UnknownType { .. })
    }

    /// 引数の数の不一致エラーかどうか
    pub fn is_argument_mismatch(&self) -> bool {
        matches!(self, TypeParseError::ArgumentMismatch { .. })
    }
}

/// 式・値の変換エラー
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    /// Symbolic function not available on the engine
    #[error("Unsupported function '{function}' for {dialect}")]
    UnsupportedFunction {
        /// 関数名
        function: String,
        /// 対象の方言
        dialect: Dialect,
    },

    /// Live evaluation of an expression failed
    #[error("Failed to evaluate expression '{expression}' (sql: {sql}): {cause}")]
    Evaluation {
        /// 評価対象の式
        expression: String,
        /// 実行したSQL
        sql: String,
        /// エラー原因
        cause: String,
    },

    /// Literal text could not be decoded into the requested type
    #[error("Invalid literal '{text}' for type {data_type}: {reason}")]
    InvalidLiteral {
        /// 入力テキスト
        text: String,
        /// 要求された共通型
        data_type: String,
        /// 不正な理由
        reason: String,
    },
}

impl TranslationError {
    /// 未サポート関数エラーかどうか
    pub fn is_unsupported_function(&self) -> bool {
        matches!(self, TranslationError::UnsupportedFunction { .. })
    }

    /// 評価エラーかどうか
    pub fn is_evaluation(&self) -> bool {
        matches!(self, TranslationError::Evaluation { .. })
    }

    /// リテラル不正エラーかどうか
    pub fn is_invalid_literal(&self) -> bool {
        matches!(self, TranslationError::InvalidLiteral { .. })
    }
}

/// 未サポート操作エラー
///
/// 特定の方言で意図的に実装していない操作を明示します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Operation '{operation}' is not supported for {dialect}")]
pub struct UnsupportedOperationError {
    /// 操作名
    pub operation: String,
    /// 対象の方言
    pub dialect: Dialect,
}

impl UnsupportedOperationError {
    /// 新しい未サポート操作エラーを作成
    pub fn new(operation: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            operation: operation.into(),
            dialect,
        }
    }
}

/// データベースエラー
///
/// データベース操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Query execution error
    #[error("Query execution error: {message}")]
    Query {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
    },

    /// Transaction error
    #[error("Transaction error: {message}")]
    Transaction {
        /// エラーメッセージ
        message: String,
    },

    /// Operation cancelled by the caller
    #[error("Database operation cancelled: {operation}")]
    Cancelled {
        /// 中断された操作
        operation: String,
    },
}

impl DatabaseError {
    /// SQL付きのクエリエラーを作成
    pub fn query(message: impl Into<String>, sql: impl Into<String>) -> Self {
        DatabaseError::Query {
            message: message.into(),
            sql: Some(sql.into()),
        }
    }

    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// クエリエラーかどうか
    pub fn is_query(&self) -> bool {
        matches!(self, DatabaseError::Query { .. })
    }

    /// キャンセルかどうか
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DatabaseError::Cancelled { .. })
    }

    /// 失敗したSQLを取得
    pub fn sql(&self) -> Option<&str> {
        match self {
            DatabaseError::Query { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }
}

/// スクリプト実行エラー
///
/// スクリプトインタープリターが実行したステートメントが失敗したことを表現します。
#[derive(Debug, Error)]
#[error("Script statement starting at line {line} failed: {source}")]
pub struct ScriptExecutionError {
    /// ステートメントの開始行（1始まり）
    pub line: usize,
    /// 失敗したステートメント
    pub statement: String,
    /// 原因となったデータベースエラー
    #[source]
    pub source: DatabaseError,
}

/// 移行エラー
///
/// オーケストレーター・アダプター・インタープリターから伝播するエラーの総称です。
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    TypeParse(#[from] TypeParseError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Script(#[from] ScriptExecutionError),

    /// Cancelled between steps
    #[error("Migration cancelled during {stage}")]
    Cancelled {
        /// 中断された段階
        stage: String,
    },

    /// Table level failure with context
    #[error("Table {table}: {source}")]
    Table {
        /// テーブル名
        table: String,
        /// 元のエラー
        #[source]
        source: Box<MigrationError>,
    },

    /// Output sink failure
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    /// テーブル名をエラーに付与
    pub fn in_table(self, table: impl Into<String>) -> Self {
        MigrationError::Table {
            table: table.into(),
            source: Box::new(self),
        }
    }

    /// 最も内側のエラー（テーブル文脈を剥がしたもの）
    pub fn root(&self) -> &MigrationError {
        match self {
            MigrationError::Table { source, .. } => source.root(),
            other => other,
        }
    }

    /// キャンセルによるエラーかどうか
    pub fn is_cancelled(&self) -> bool {
        match self.root() {
            MigrationError::Cancelled { .. } => true,
            MigrationError::Database(e) => e.is_cancelled(),
            MigrationError::Script(e) => e.source.is_cancelled(),
            _ => false,
        }
    }

    /// 未サポート操作エラーかどうか
    pub fn is_unsupported(&self) -> bool {
        matches!(self.root(), MigrationError::Unsupported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parse_error_predicates() {
        let error = TypeParseError::Malformed {
            text: "int 2".to_string(),
        };
        assert!(error.is_malformed());
        assert!(!error.is_unknown_type());
        assert!(error.to_string().contains("int 2"));
    }

    #[test]
    fn test_argument_mismatch_message() {
        let error = TypeParseError::ArgumentMismatch {
            tag: "decimal".to_string(),
            expected: 2,
            actual: 1,
            text: "decimal(10)".to_string(),
        };
        assert!(error.is_argument_mismatch());
        let message = error.to_string();
        assert!(message.contains("decimal(10)"));
        assert!(message.contains("expected 2"));
    }

    #[test]
    fn test_unsupported_function_message() {
        let error = TranslationError::UnsupportedFunction {
            function: "uuid".to_string(),
            dialect: Dialect::SQLite,
        };
        assert!(error.is_unsupported_function());
        assert_eq!(error.to_string(), "Unsupported function 'uuid' for sqlite");
    }

    #[test]
    fn test_database_error_variants() {
        let conn_error = DatabaseError::Connection {
            message: "Connection failed".to_string(),
            cause: "Timeout".to_string(),
        };
        assert!(conn_error.is_connection());

        let query_error = DatabaseError::query("Query failed", "SELECT 1");
        assert!(query_error.is_query());
        assert_eq!(query_error.sql(), Some("SELECT 1"));

        let cancelled = DatabaseError::Cancelled {
            operation: "read_page".to_string(),
        };
        assert!(cancelled.is_cancelled());
    }

    #[test]
    fn test_migration_error_table_context() {
        let error = MigrationError::from(UnsupportedOperationError::new(
            "drop_database_if_exists",
            Dialect::SQLite,
        ))
        .in_table("users");

        assert!(error.is_unsupported());
        assert!(error.to_string().contains("users"));
        assert!(!error.is_cancelled());
    }

    #[test]
    fn test_migration_error_cancelled_through_database() {
        let error = MigrationError::from(DatabaseError::Cancelled {
            operation: "write_page".to_string(),
        });
        assert!(error.is_cancelled());
    }
}
