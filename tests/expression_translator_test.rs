/// 式変換のテスト
///
/// 評価SQLを記録するエバリュエーターを使用して、関数の認識・評価結果のキャッシュ・
/// NULLの扱い・方言間での往復を確認します。

#[cfg(test)]
mod expression_translator_tests {
    use async_trait::async_trait;
    use dataferry::adapters::engine_adapter::SqlEvaluator;
    use dataferry::adapters::expression_translator::{
        create_expression_translator, strip_outer_parentheses,
    };
    use dataferry::adapters::value_representer::create_representer;
    use dataferry::core::config::Dialect;
    use dataferry::core::error::{DatabaseError, MigrationError, TranslationError};
    use dataferry::core::schema::{DataTypeDescriptor, SqlExpressionDescriptor, SqlFunction};
    use dataferry::core::value::SqlValue;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    /// 評価SQLを記録し、決まった値を返すエバリュエーター
    struct RecordingEvaluator {
        result: Result<SqlValue, DatabaseError>,
        evaluated: Mutex<Vec<String>>,
    }

    impl RecordingEvaluator {
        fn returning(value: SqlValue) -> Self {
            Self {
                result: Ok(value),
                evaluated: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(DatabaseError::query("no such column: foo", "SELECT foo")),
                evaluated: Mutex::new(Vec::new()),
            }
        }

        fn evaluated(&self) -> Vec<String> {
            self.evaluated.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SqlEvaluator for RecordingEvaluator {
        async fn evaluate_scalar(
            &self,
            sql: &str,
            _data_type: &DataTypeDescriptor,
            _cancel: &CancellationToken,
        ) -> Result<SqlValue, DatabaseError> {
            self.evaluated.lock().unwrap().push(sql.to_string());
            match &self.result {
                Ok(value) => Ok(value.clone()),
                Err(e) => Err(DatabaseError::query(e.to_string(), sql)),
            }
        }
    }

    /// 既知の関数パターンは評価せずに共通関数へ変換されることを確認
    #[tokio::test]
    async fn test_known_functions_are_recognized_without_evaluation() {
        let translator = create_expression_translator(
            Dialect::PostgreSQL,
            create_representer(Dialect::PostgreSQL),
        );
        let evaluator = RecordingEvaluator::returning(SqlValue::Null);
        let cancel = CancellationToken::new();

        let cases = [
            ("now()", SqlFunction::Now),
            ("CURRENT_TIMESTAMP", SqlFunction::Now),
            ("(now() AT TIME ZONE 'utc'::text)", SqlFunction::UtcNow),
            ("CURRENT_DATE", SqlFunction::Today),
            ("gen_random_uuid()", SqlFunction::Uuid),
        ];
        for (text, expected) in cases {
            let expression = translator
                .to_common_expression(text, &DataTypeDescriptor::text(), &evaluator, &cancel)
                .await
                .unwrap();
            assert_eq!(expression, Some(SqlExpressionDescriptor::Function(expected)), "{}", text);
        }
        assert!(evaluator.evaluated().is_empty());
    }

    /// 空文字列とNULLはデフォルトなしとして扱われることを確認
    #[tokio::test]
    async fn test_empty_and_null_defaults_are_absent() {
        let translator =
            create_expression_translator(Dialect::SQLite, create_representer(Dialect::SQLite));
        let evaluator = RecordingEvaluator::returning(SqlValue::Int(1));
        let cancel = CancellationToken::new();

        for text in ["", "  ", "NULL", "null", "(NULL)"] {
            let expression = translator
                .to_common_expression(text, &DataTypeDescriptor::integer(), &evaluator, &cancel)
                .await
                .unwrap();
            assert_eq!(expression, None, "{:?}", text);
        }
        assert!(evaluator.evaluated().is_empty());
    }

    /// 関数以外の式は移行元で評価され、結果がリテラルになることを確認
    #[tokio::test]
    async fn test_expression_is_evaluated_into_literal() {
        let translator =
            create_expression_translator(Dialect::SQLite, create_representer(Dialect::SQLite));
        let evaluator = RecordingEvaluator::returning(SqlValue::Int(2));

        let expression = translator
            .to_common_expression(
                "1 + 1",
                &DataTypeDescriptor::integer(),
                &evaluator,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            expression,
            Some(SqlExpressionDescriptor::Literal(SqlValue::Int(2)))
        );
        let evaluated = evaluator.evaluated();
        assert_eq!(evaluated.len(), 1);
        assert!(evaluated[0].starts_with("SELECT CAST(1 + 1 AS "));
        assert!(evaluated[0].ends_with(" AS value"));
    }

    /// 評価結果がNULLならデフォルトなしになることを確認
    #[tokio::test]
    async fn test_null_evaluation_result_is_absent() {
        let translator =
            create_expression_translator(Dialect::MySQL, create_representer(Dialect::MySQL));
        let evaluator = RecordingEvaluator::returning(SqlValue::Null);

        let expression = translator
            .to_common_expression(
                "IF(1 = 0, 1, NULL)",
                &DataTypeDescriptor::integer(),
                &evaluator,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(expression, None);
        assert_eq!(evaluator.evaluated().len(), 1);
    }

    /// 同じ式の2回目の変換はキャッシュされた結果を使うことを確認
    #[tokio::test]
    async fn test_evaluation_results_are_cached() {
        let translator =
            create_expression_translator(Dialect::SQLite, create_representer(Dialect::SQLite));
        let evaluator = RecordingEvaluator::returning(SqlValue::Text("draft".to_string()));
        let cancel = CancellationToken::new();
        let data_type = DataTypeDescriptor::varchar(20);

        for _ in 0..3 {
            let expression = translator
                .to_common_expression("'draft'", &data_type, &evaluator, &cancel)
                .await
                .unwrap();
            assert_eq!(
                expression,
                Some(SqlExpressionDescriptor::Literal(SqlValue::Text("draft".to_string())))
            );
        }
        assert_eq!(evaluator.evaluated().len(), 1);
    }

    /// 評価に失敗した場合は式とSQLを含む変換エラーになることを確認
    #[tokio::test]
    async fn test_evaluation_failure_becomes_translation_error() {
        let translator =
            create_expression_translator(Dialect::SQLite, create_representer(Dialect::SQLite));
        let evaluator = RecordingEvaluator::failing();

        let error = translator
            .to_common_expression(
                "foo",
                &DataTypeDescriptor::integer(),
                &evaluator,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match error {
            MigrationError::Translation(TranslationError::Evaluation { expression, sql, .. }) => {
                assert_eq!(expression, "foo");
                assert!(sql.contains("CAST(foo AS"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    /// 共通関数を別の方言のテキストへ変換できることを確認
    #[test]
    fn test_function_translated_between_dialects() {
        let mysql = create_expression_translator(Dialect::MySQL, create_representer(Dialect::MySQL));
        let postgres = create_expression_translator(
            Dialect::PostgreSQL,
            create_representer(Dialect::PostgreSQL),
        );
        let expression = SqlExpressionDescriptor::Function(SqlFunction::Today);

        let mysql_text = mysql
            .to_engine_text(&expression, "DATE", &DataTypeDescriptor::text())
            .unwrap();
        let postgres_text = postgres
            .to_engine_text(&expression, "DATE", &DataTypeDescriptor::text())
            .unwrap();

        assert_eq!(
            mysql.recognize_function(&strip_outer_parentheses(&mysql_text)),
            Some(SqlFunction::Today)
        );
        assert_eq!(postgres_text, "current_date");
    }

    /// SQLiteではUUID生成関数が未サポートエラーになることを確認
    #[test]
    fn test_uuid_default_unsupported_on_sqlite() {
        let sqlite =
            create_expression_translator(Dialect::SQLite, create_representer(Dialect::SQLite));

        let error = sqlite
            .to_engine_text(
                &SqlExpressionDescriptor::Function(SqlFunction::Uuid),
                "TEXT",
                &DataTypeDescriptor::text(),
            )
            .unwrap_err();

        assert!(error.is_unsupported_function());
    }

    /// リテラルのデフォルト値がカラム型に合わせて表現されることを確認
    #[test]
    fn test_literal_default_uses_column_type() {
        let postgres = create_expression_translator(
            Dialect::PostgreSQL,
            create_representer(Dialect::PostgreSQL),
        );

        let text = postgres
            .to_engine_text(
                &SqlExpressionDescriptor::Literal(SqlValue::Int(0)),
                "BOOLEAN",
                &DataTypeDescriptor::boolean(),
            )
            .unwrap();
        assert_eq!(text, "FALSE");

        let text = postgres
            .to_engine_text(
                &SqlExpressionDescriptor::Literal(SqlValue::Text("it's".to_string())),
                "TEXT",
                &DataTypeDescriptor::text(),
            )
            .unwrap();
        assert_eq!(text, "'it''s'");
    }
}
