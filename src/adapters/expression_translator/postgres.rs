// PostgreSQL用式変換

use super::{
    function_pattern, replace_outside_quotes, EvaluationCache, ExpressionTranslator,
    FunctionPatterns,
};
use crate::adapters::type_mapping::TypeMappingService;
use crate::adapters::value_representer::ValueRepresenter;
use crate::core::config::Dialect;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag, SqlFunction};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static FUNCTIONS: LazyLock<FunctionPatterns> = LazyLock::new(|| {
    vec![
        function_pattern(
            r"now\(\)|current_timestamp|localtimestamp|transaction_timestamp\(\)",
            SqlFunction::Now,
        ),
        function_pattern(
            r"\(?now\(\) at time zone 'utc'\)?|timezone\('utc', now\(\)\)",
            SqlFunction::UtcNow,
        ),
        function_pattern(r"current_date", SqlFunction::Today),
        function_pattern(
            r"gen_random_uuid\(\)|uuid_generate_v4\(\)",
            SqlFunction::Uuid,
        ),
    ]
});

/// `::type` 形式のキャスト注釈
static CAST_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)::(?:"[^"]+"|[a-z_][a-z0-9_]*(?:\s+(?:varying|precision|with(?:out)?\s+time\s+zone))?)(?:\(\d+(?:,\s*\d+)?\))?(?:\[\])?"#,
    )
    .expect("valid regex")
});

/// PostgreSQL用式変換
pub struct PostgresExpressionTranslator {
    representer: Arc<dyn ValueRepresenter>,
    types: TypeMappingService,
    cache: EvaluationCache,
}

impl PostgresExpressionTranslator {
    /// 新しいPostgresExpressionTranslatorを作成
    pub fn new(representer: Arc<dyn ValueRepresenter>) -> Self {
        Self {
            representer,
            types: TypeMappingService::new(Dialect::PostgreSQL),
            cache: EvaluationCache::default(),
        }
    }
}

impl ExpressionTranslator for PostgresExpressionTranslator {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
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
        Some(match function {
            SqlFunction::Now => "now()",
            SqlFunction::UtcNow => "(now() at time zone 'utc')",
            SqlFunction::Today => "current_date",
            SqlFunction::Uuid => "gen_random_uuid()",
        })
    }

    fn function_patterns(&self) -> &FunctionPatterns {
        &FUNCTIONS
    }

    fn strip_annotations(&self, text: &str) -> String {
        replace_outside_quotes(text, &CAST_ANNOTATION, "")
    }

    /// GUID・バイナリ・オフセット付き日時のリテラルには型キャストを付与
    fn decorate_literal(
        &self,
        literal: String,
        target_type_text: &str,
        data_type: &DataTypeDescriptor,
    ) -> String {
        match data_type.tag() {
            DataTypeTag::Guid
            | DataTypeTag::Binary
            | DataTypeTag::Varbinary
            | DataTypeTag::Blob
            | DataTypeTag::DateTimeOffset => format!("{}::{}", literal, target_type_text),
            _ => literal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::value_representer::create_representer;
    use crate::core::schema::SqlExpressionDescriptor;
    use crate::core::value::SqlValue;

    fn translator() -> PostgresExpressionTranslator {
        PostgresExpressionTranslator::new(create_representer(Dialect::PostgreSQL))
    }

    #[test]
    fn test_function_texts() {
        let translator = translator();
        let data_type = DataTypeDescriptor::scalar(DataTypeTag::DateTime).unwrap();
        assert_eq!(
            translator
                .to_engine_text(
                    &SqlExpressionDescriptor::Function(SqlFunction::UtcNow),
                    "TIMESTAMP",
                    &data_type
                )
                .unwrap(),
            "(now() at time zone 'utc')"
        );
    }

    #[test]
    fn test_guid_literal_gets_cast() {
        let translator = translator();
        let data_type = DataTypeDescriptor::scalar(DataTypeTag::Guid).unwrap();
        let value = SqlValue::Guid(
            uuid::Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap(),
        );
        let text = translator
            .to_engine_text(&SqlExpressionDescriptor::Literal(value), "UUID", &data_type)
            .unwrap();
        assert_eq!(text, "'00000000-0000-0000-0000-000000000001'::UUID");
    }

    #[test]
    fn test_recognize_functions_after_stripping_casts() {
        let translator = translator();
        let stripped = translator.strip_annotations("timezone('utc'::text, now())");
        assert_eq!(
            translator.recognize_function(&stripped),
            Some(SqlFunction::UtcNow)
        );
        assert_eq!(
            translator.recognize_function("CURRENT_TIMESTAMP"),
            Some(SqlFunction::Now)
        );
        assert_eq!(
            translator.recognize_function("uuid_generate_v4()"),
            Some(SqlFunction::Uuid)
        );
        assert_eq!(translator.recognize_function("now() + 1"), None);
    }

    #[test]
    fn test_strip_annotations_keeps_quoted_text() {
        let translator = translator();
        assert_eq!(
            translator.strip_annotations("'a::b'::character varying"),
            "'a::b'"
        );
        assert_eq!(
            translator.strip_annotations("'2024-01-01 00:00:00'::timestamp without time zone"),
            "'2024-01-01 00:00:00'"
        );
    }

    #[test]
    fn test_raw_passthrough_and_null_literal() {
        let translator = translator();
        let data_type = DataTypeDescriptor::text();
        assert_eq!(
            translator
                .to_engine_text(&SqlExpressionDescriptor::Raw("'x' || 'y'".to_string()), "TEXT", &data_type)
                .unwrap(),
            "'x' || 'y'"
        );
        assert_eq!(
            translator
                .to_engine_text(&SqlExpressionDescriptor::Literal(SqlValue::Null), "TEXT", &data_type)
                .unwrap(),
            "NULL"
        );
    }
}
