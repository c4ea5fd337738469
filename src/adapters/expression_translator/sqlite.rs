// SQLite用式変換

use super::{function_pattern, EvaluationCache, ExpressionTranslator, FunctionPatterns};
use crate::adapters::type_mapping::TypeMappingService;
use crate::adapters::value_representer::ValueRepresenter;
use crate::core::config::Dialect;
use crate::core::schema::SqlFunction;
use std::sync::{Arc, LazyLock};

static FUNCTIONS: LazyLock<FunctionPatterns> = LazyLock::new(|| {
    vec![
        function_pattern(r"datetime\('now', ?'localtime'\)", SqlFunction::Now),
        function_pattern(r"current_timestamp|datetime\('now'\)", SqlFunction::UtcNow),
        function_pattern(r"current_date|date\('now'\)", SqlFunction::Today),
    ]
});

/// SQLite用式変換
///
/// SQLiteにはUUID生成関数がないため、`Uuid` は未サポートです。
pub struct SqliteExpressionTranslator {
    representer: Arc<dyn ValueRepresenter>,
    types: TypeMappingService,
    cache: EvaluationCache,
}

impl SqliteExpressionTranslator {
    /// 新しいSqliteExpressionTranslatorを作成
    pub fn new(representer: Arc<dyn ValueRepresenter>) -> Self {
        Self {
            representer,
            types: TypeMappingService::new(Dialect::SQLite),
            cache: EvaluationCache::default(),
        }
    }
}

impl ExpressionTranslator for SqliteExpressionTranslator {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn representer(&self) -> &dyn ValueRepresenter {
        self.representer.as_ref()
    }

    fn types(&self) -> &TypeMappingService {
        &self.types
    }

    fn cache(&self) -> &EvaluationCache {
        &self.cache
    }

    fn function_text(&self, function: SqlFunction) -> Option<&'static str> {
        match function {
            SqlFunction::Now => Some("(datetime('now', 'localtime'))"),
            SqlFunction::UtcNow => Some("CURRENT_TIMESTAMP"),
            SqlFunction::Today => Some("CURRENT_DATE"),
            SqlFunction::Uuid => None,
        }
    }

    fn function_patterns(&self) -> &FunctionPatterns {
        &FUNCTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::value_representer::create_representer;
    use crate::core::schema::{DataTypeDescriptor, DataTypeTag, SqlExpressionDescriptor};

    fn translator() -> SqliteExpressionTranslator {
        SqliteExpressionTranslator::new(create_representer(Dialect::SQLite))
    }

    #[test]
    fn test_uuid_is_unsupported() {
        let translator = translator();
        let data_type = DataTypeDescriptor::scalar(DataTypeTag::Guid).unwrap();
        let error = translator
            .to_engine_text(
                &SqlExpressionDescriptor::Function(SqlFunction::Uuid),
                "TEXT",
                &data_type,
            )
            .unwrap_err();
        assert!(error.is_unsupported_function());
        assert!(error.to_string().contains("uuid"));
    }

    #[test]
    fn test_recognize_functions() {
        let translator = translator();
        assert_eq!(
            translator.recognize_function("CURRENT_TIMESTAMP"),
            Some(SqlFunction::UtcNow)
        );
        assert_eq!(
            translator.recognize_function("datetime('now','localtime')"),
            Some(SqlFunction::Now)
        );
        assert_eq!(translator.recognize_function("current_date"), Some(SqlFunction::Today));
        assert_eq!(translator.recognize_function("random()"), None);
    }

    #[test]
    fn test_now_round_trips_through_function_text() {
        let translator = translator();
        let text = translator.function_text(SqlFunction::Now).unwrap();
        let stripped = super::super::strip_outer_parentheses(text);
        assert_eq!(translator.recognize_function(&stripped), Some(SqlFunction::Now));
    }
}
