// 式変換サービス
//
// カラムのデフォルト値などの式を、共通の SqlExpressionDescriptor と
// エンジン固有のSQLテキストとの間で双方向に変換します。
// 関数パターンに一致しない式は、移行元エンジンで `SELECT CAST(<expr> AS <type>)` を実行して値を確定します。

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlExpressionTranslator;
pub use postgres::PostgresExpressionTranslator;
pub use sqlite::SqliteExpressionTranslator;

use crate::adapters::engine_adapter::SqlEvaluator;
use crate::adapters::type_mapping::TypeMappingService;
use crate::adapters::value_representer::ValueRepresenter;
use crate::core::config::Dialect;
use crate::core::error::{DatabaseError, MigrationError, TranslationError};
use crate::core::schema::{DataTypeDescriptor, SqlExpressionDescriptor, SqlFunction};
use crate::core::value::SqlValue;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 式評価結果のキャッシュ
///
/// 評価に使用したSQLテキストをキーとします。
/// エントリは挿入単位で完結するため、ポイズン状態のロックもそのまま使用します。
#[derive(Debug, Default)]
pub struct EvaluationCache {
    entries: Mutex<HashMap<String, SqlValue>>,
}

impl EvaluationCache {
    pub fn get(&self, sql: &str) -> Option<SqlValue> {
        self.lock().get(sql).cloned()
    }

    pub fn insert(&self, sql: String, value: SqlValue) {
        self.lock().insert(sql, value);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SqlValue>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Evaluation cache lock was poisoned; reusing cached entries");
            poisoned.into_inner()
        })
    }
}

/// 関数パターン（大文字小文字を区別しない）と共通関数の対応表
pub type FunctionPatterns = Vec<(Regex, SqlFunction)>;

/// 評価結果を取り出すSELECTのエイリアス
pub const EVALUATED_COLUMN: &str = "value";

/// 式変換トレイト
///
/// 各方言ごとに1つの実装を持ちます。関数表・キャスト除去・リテラルの装飾だけを
/// 方言側で定義し、変換の流れは既定実装で共有します。
#[async_trait]
pub trait ExpressionTranslator: Send + Sync {
    /// 対象の方言
    fn dialect(&self) -> Dialect;

    /// リテラル生成に使用する値表現
    fn representer(&self) -> &dyn ValueRepresenter;

    /// キャスト型の解決に使用する型マッピング
    fn types(&self) -> &TypeMappingService;

    /// 評価結果キャッシュ
    fn cache(&self) -> &EvaluationCache;

    /// 共通関数に対応するエンジンのSQLテキスト（未対応ならNone）
    fn function_text(&self, function: SqlFunction) -> Option<&'static str>;

    /// 関数パターン表
    fn function_patterns(&self) -> &FunctionPatterns;

    /// エンジン固有の注釈（キャスト・文字セット指定など）を除去
    fn strip_annotations(&self, text: &str) -> String {
        text.to_string()
    }

    /// リテラルのデフォルト値を方言の構文に合わせて装飾
    fn decorate_literal(
        &self,
        literal: String,
        _target_type_text: &str,
        _data_type: &DataTypeDescriptor,
    ) -> String {
        literal
    }

    /// テキストが既知の関数パターンに一致すれば共通関数を返す
    fn recognize_function(&self, text: &str) -> Option<SqlFunction> {
        let text = collapse_whitespace(text);
        self.function_patterns()
            .iter()
            .find(|(pattern, _)| pattern.is_match(&text))
            .map(|(_, function)| *function)
    }

    /// 共通式 -> エンジンのSQLテキスト
    ///
    /// # Arguments
    ///
    /// * `expression` - 共通式
    /// * `target_type_text` - ターゲットのネイティブ型（例: "UUID"）
    /// * `data_type` - カラムの共通型
    fn to_engine_text(
        &self,
        expression: &SqlExpressionDescriptor,
        target_type_text: &str,
        data_type: &DataTypeDescriptor,
    ) -> Result<String, TranslationError> {
        match expression {
            SqlExpressionDescriptor::Function(function) => self
                .function_text(*function)
                .map(str::to_string)
                .ok_or_else(|| TranslationError::UnsupportedFunction {
                    function: function.name().to_string(),
                    dialect: self.dialect(),
                }),
            SqlExpressionDescriptor::Literal(value) => {
                let literal = self.representer().represent_typed(value, data_type);
                if value.is_null() {
                    return Ok(literal);
                }
                Ok(self.decorate_literal(literal, target_type_text, data_type))
            }
            SqlExpressionDescriptor::Raw(text) => Ok(text.clone()),
        }
    }

    /// 評価用のSELECT文
    fn evaluation_sql(&self, expression: &str, data_type: &DataTypeDescriptor) -> String {
        format!(
            "SELECT CAST({} AS {}) AS {}",
            expression,
            self.types().to_cast_type(data_type),
            EVALUATED_COLUMN
        )
    }

    /// エンジンのSQLテキスト -> 共通式
    ///
    /// 空文字列と `NULL` は「デフォルトなし」として None を返します。
    async fn to_common_expression(
        &self,
        engine_text: &str,
        data_type: &DataTypeDescriptor,
        evaluator: &dyn SqlEvaluator,
        cancel: &CancellationToken,
    ) -> Result<Option<SqlExpressionDescriptor>, MigrationError> {
        let stripped = strip_outer_parentheses(&self.strip_annotations(engine_text.trim()));
        if stripped.is_empty() || stripped.eq_ignore_ascii_case("NULL") {
            return Ok(None);
        }

        if let Some(function) = self.recognize_function(&stripped) {
            return Ok(Some(SqlExpressionDescriptor::Function(function)));
        }

        let sql = self.evaluation_sql(&stripped, data_type);
        let cached = self.cache().get(&sql);
        let value = match cached {
            Some(value) => value,
            None => {
                debug!(dialect = %self.dialect(), %sql, "Evaluating default expression");
                let value = evaluator
                    .evaluate_scalar(&sql, data_type, cancel)
                    .await
                    .map_err(|e| match e {
                        DatabaseError::Cancelled { .. } => MigrationError::Database(e),
                        other => MigrationError::Translation(TranslationError::Evaluation {
                            expression: engine_text.to_string(),
                            sql: sql.clone(),
                            cause: other.to_string(),
                        }),
                    })?;
                self.cache().insert(sql, value.clone());
                value
            }
        };

        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(SqlExpressionDescriptor::Literal(value)))
    }
}

/// 方言に応じた式変換を作成
pub fn create_expression_translator(
    dialect: Dialect,
    representer: Arc<dyn ValueRepresenter>,
) -> Box<dyn ExpressionTranslator> {
    match dialect {
        Dialect::PostgreSQL => Box::new(PostgresExpressionTranslator::new(representer)),
        Dialect::MySQL => Box::new(MySqlExpressionTranslator::new(representer)),
        Dialect::SQLite => Box::new(SqliteExpressionTranslator::new(representer)),
    }
}

/// 大文字小文字を区別しない関数パターンを作成
pub(crate) fn function_pattern(pattern: &str, function: SqlFunction) -> (Regex, SqlFunction) {
    let regex = Regex::new(&format!("(?i)^(?:{})$", pattern)).expect("valid regex");
    (regex, function)
}

/// 式全体を囲む括弧を除去
///
/// `(a) + (b)` のように先頭と末尾の括弧が対応しない場合はそのまま返します。
pub fn strip_outer_parentheses(text: &str) -> String {
    let mut current = text.trim();
    while current.starts_with('(') && current.ends_with(')') && encloses_whole(current) {
        current = current[1..current.len() - 1].trim();
    }
    current.to_string()
}

fn encloses_whole(text: &str) -> bool {
    let mut depth = 0usize;
    let mut in_quote = false;
    let last = text.len() - 1;
    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// 引用符の外側だけに置換を適用
pub fn replace_outside_quotes(text: &str, pattern: &Regex, replacement: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut unquoted = String::new();
    let mut quoted = String::new();
    let mut in_quote = false;

    for c in text.chars() {
        if in_quote {
            quoted.push(c);
            if c == '\'' {
                result.push_str(&quoted);
                quoted.clear();
                in_quote = false;
            }
        } else if c == '\'' {
            result.push_str(&pattern.replace_all(&unquoted, replacement));
            unquoted.clear();
            quoted.push(c);
            in_quote = true;
        } else {
            unquoted.push(c);
        }
    }

    result.push_str(&quoted);
    result.push_str(&pattern.replace_all(&unquoted, replacement));
    result
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// 連続する空白を1つにまとめる
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
