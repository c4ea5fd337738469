// スクリプトインタープリター
//
// 前後スクリプトやダンプの再生に使う、行単位のSQLスクリプト実行器。
// SQL文法は解析せず、引用符・コメント・終端行だけを認識して文に分割します。

pub mod content_reader;
pub mod line_handler;
pub mod line_source;

pub use content_reader::{
    default_readers, CommentReader, ContentReader, QuotedReader, Span, StringEscapes,
};
pub use line_handler::{CommandHandler, NoOpHandler, PendingStatement, StatementTerminator};
pub use line_source::LineSource;

use crate::adapters::engine_adapter::StatementExecutor;
use crate::core::config::Dialect;
use crate::core::error::{MigrationError, ScriptExecutionError};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// インタープリターの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    /// 行の種類を判定中
    ScanningLine,
    /// 文を蓄積中
    AccumulatingStatement,
    /// 入力の終わり
    Done,
}

/// スクリプトインタープリター
pub struct ScriptInterpreter {
    no_op: NoOpHandler,
    command: CommandHandler,
}

impl ScriptInterpreter {
    /// 新しいScriptInterpreterを作成
    ///
    /// # Arguments
    ///
    /// * `terminator` - 文の終端
    /// * `backslash_escape` - すべての文字列リテラルでバックスラッシュエスケープを認めるか
    pub fn new(terminator: StatementTerminator, backslash_escape: bool) -> Self {
        let escapes = if backslash_escape {
            StringEscapes::Backslash
        } else {
            StringEscapes::Standard
        };
        Self::with_escapes(terminator, escapes)
    }

    /// 文字列リテラルのエスケープ規則を指定して作成
    pub fn with_escapes(terminator: StatementTerminator, escapes: StringEscapes) -> Self {
        Self {
            no_op: NoOpHandler,
            command: CommandHandler::new(default_readers(escapes), terminator),
        }
    }

    /// 方言の文字列リテラル規則に合わせたインタープリターを作成
    ///
    /// MySQLはすべての文字列で、PostgreSQLは `E'...'` の中だけでバックスラッシュエスケープを使用します。
    pub fn for_dialect(dialect: Dialect, terminator: StatementTerminator) -> Self {
        let escapes = match dialect {
            Dialect::PostgreSQL => StringEscapes::EscapeStringOnly,
            Dialect::MySQL => StringEscapes::Backslash,
            Dialect::SQLite => StringEscapes::Standard,
        };
        Self::with_escapes(terminator, escapes)
    }

    /// スクリプトを文に分割（実行はしない）
    pub fn statements(&self, script: &str) -> Vec<PendingStatement> {
        let mut stream = StatementStream::new(self, script);
        std::iter::from_fn(|| stream.next_statement()).collect()
    }

    /// スクリプトを1文ずつ実行し、実行した文の数を返す
    ///
    /// 文の実行に失敗した時点で中断し、残りの文は実行しません。
    pub async fn execute(
        &self,
        script: &str,
        executor: &dyn StatementExecutor,
        cancel: &CancellationToken,
    ) -> Result<usize, MigrationError> {
        let mut stream = StatementStream::new(self, script);
        let mut executed = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(MigrationError::Cancelled {
                    stage: "script".to_string(),
                });
            }
            let Some(statement) = stream.next_statement() else {
                break;
            };

            debug!(line = statement.line, "Executing script statement");
            executor
                .execute(&statement.text, cancel)
                .await
                .map_err(|source| ScriptExecutionError {
                    line: statement.line,
                    statement: statement.text.clone(),
                    source,
                })?;
            executed += 1;
        }

        Ok(executed)
    }

    /// スクリプトファイルを読み込んで実行
    pub async fn execute_file(
        &self,
        path: &Path,
        executor: &dyn StatementExecutor,
        cancel: &CancellationToken,
    ) -> Result<usize, MigrationError> {
        let script = tokio::fs::read_to_string(path).await?;
        info!(path = %path.display(), terminator = self.command.terminator().name(), "Running script");
        let executed = self.execute(&script, executor, cancel).await?;
        info!(path = %path.display(), statements = executed, "Script finished");
        Ok(executed)
    }
}

/// 状態機械による文の取り出し
struct StatementStream<'i, 's> {
    interpreter: &'i ScriptInterpreter,
    source: LineSource<'s>,
    state: InterpreterState,
}

impl<'i, 's> StatementStream<'i, 's> {
    fn new(interpreter: &'i ScriptInterpreter, script: &'s str) -> Self {
        Self {
            interpreter,
            source: LineSource::new(script),
            state: InterpreterState::ScanningLine,
        }
    }

    /// 次の文まで状態を進める
    fn next_statement(&mut self) -> Option<PendingStatement> {
        loop {
            match self.state {
                InterpreterState::ScanningLine => {
                    self.interpreter.no_op.consume(&mut self.source);
                    self.state = if self.source.is_exhausted() {
                        InterpreterState::Done
                    } else {
                        InterpreterState::AccumulatingStatement
                    };
                }
                InterpreterState::AccumulatingStatement => {
                    self.state = InterpreterState::ScanningLine;
                    if let Some(statement) = self.interpreter.command.accumulate(&mut self.source) {
                        return Some(statement);
                    }
                }
                InterpreterState::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_skip_comments_and_blank_lines() {
        let interpreter = ScriptInterpreter::new(StatementTerminator::semicolon(), false);
        let statements = interpreter.statements(
            "-- setup\n\nCREATE TABLE t (id INT);\n\nINSERT INTO t VALUES (1);\n",
        );

        assert_eq!(
            statements,
            vec![
                PendingStatement {
                    line: 3,
                    text: "CREATE TABLE t (id INT)".to_string()
                },
                PendingStatement {
                    line: 5,
                    text: "INSERT INTO t VALUES (1)".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_go_batches_are_not_statements() {
        let interpreter = ScriptInterpreter::new(StatementTerminator::go(), false);
        let statements = interpreter.statements("go\nGO\nSELECT 1\ngo\n");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].text, "SELECT 1");
    }

    #[test]
    fn test_for_dialect_honors_backslash_escapes() {
        let postgres = ScriptInterpreter::for_dialect(Dialect::PostgreSQL, StatementTerminator::semicolon());
        let statements = postgres.statements("INSERT INTO t VALUES (E'a\\';');\nSELECT 1;");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].text, "INSERT INTO t VALUES (E'a\\';')");
    }
}
