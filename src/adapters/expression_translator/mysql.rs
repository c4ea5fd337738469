// MySQL用式変換

use super::{function_pattern, EvaluationCache, ExpressionTranslator, FunctionPatterns};
use crate::adapters::type_mapping::TypeMappingService;
use crate::adapters::value_representer::ValueRepresenter;
use crate::core::config::Dialect;
use crate::core::schema::{DataTypeDescriptor, DataTypeTag, SqlFunction};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static FUNCTIONS: LazyLock<FunctionPatterns> = LazyLock::new(|| {
    vec![
        function_pattern(
            r"(?:current_timestamp|localtimestamp|localtime)(?:\(\d*\))?|now\(\d*\)",
            SqlFunction::Now,
        ),
        function_pattern(r"utc_timestamp(?:\(\d*\))?", SqlFunction::UtcNow),
        function_pattern(r"curdate\(\)|current_date(?:\(\))?", SqlFunction::Today),
        function_pattern(r"uuid\(\)", SqlFunction::Uuid),
    ]
});

/// 文字セット指定子（`_utf8mb4'abc'`）
static CHARSET_INTRODUCER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)_(?:utf8mb4|utf8mb3|utf8|latin1|ascii|binary)'").expect("valid regex")
});

/// MySQL用式変換
pub struct MySqlExpressionTranslator {
    representer: Arc<dyn ValueRepresenter>,
    types: TypeMappingService,
    cache: EvaluationCache,
}

impl MySqlExpressionTranslator {
    /// 新しいMySqlExpressionTranslatorを作成
    pub fn new(representer: Arc<dyn ValueRepresenter>) -> Self {
        Self {
            representer,
            types: TypeMappingService::new(Dialect::MySQL),
            cache: EvaluationCache::default(),
        }
    }
}

impl ExpressionTranslator for MySqlExpressionTranslator {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
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

    /// DATETIME(6) のデフォルトは同じ精度の関数でなければならない
    fn function_text(&self, function: SqlFunction) -> Option<&'static str> {
        Some(match function {
            SqlFunction::Now => "current_timestamp(6)",
            SqlFunction::UtcNow => "(utc_timestamp(6))",
            SqlFunction::Today => "(curdate())",
            SqlFunction::Uuid => "(uuid())",
        })
    }

    fn function_patterns(&self) -> &FunctionPatterns {
        &FUNCTIONS
    }

    /// INFORMATION_SCHEMA は式のデフォルトを `_utf8mb4\'abc\'` の形で返す
    fn strip_annotations(&self, text: &str) -> String {
        let unescaped = text.replace("\\'", "'");
        CHARSET_INTRODUCER.replace_all(&unescaped, "'").into_owned()
    }

    /// TEXT・BLOB・JSON のデフォルト値は括弧で囲んだ式でなければならない
    fn decorate_literal(
        &self,
        literal: String,
        _target_type_text: &str,
        data_type: &DataTypeDescriptor,
    ) -> String {
        match data_type.tag() {
            DataTypeTag::Text | DataTypeTag::Blob | DataTypeTag::Json => format!("({})", literal),
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

    fn translator() -> MySqlExpressionTranslator {
        MySqlExpressionTranslator::new(create_representer(Dialect::MySQL))
    }

    #[test]
    fn test_recognize_precision_variants() {
        let translator = translator();
        assert_eq!(
            translator.recognize_function("CURRENT_TIMESTAMP(6)"),
            Some(SqlFunction::Now)
        );
        assert_eq!(
            translator.recognize_function("current_timestamp()"),
            Some(SqlFunction::Now)
        );
        assert_eq!(
            translator.recognize_function("utc_timestamp(3)"),
            Some(SqlFunction::UtcNow)
        );
        assert_eq!(translator.recognize_function("curdate()"), Some(SqlFunction::Today));
        assert_eq!(translator.recognize_function("uuid()"), Some(SqlFunction::Uuid));
    }

    #[test]
    fn test_strip_charset_introducer() {
        let translator = translator();
        assert_eq!(translator.strip_annotations("_utf8mb4\\'abc\\'"), "'abc'");
    }

    #[test]
    fn test_text_literal_default_is_parenthesized() {
        let translator = translator();
        let text = translator
            .to_engine_text(
                &SqlExpressionDescriptor::Literal(SqlValue::Text("n/a".to_string())),
                "LONGTEXT",
                &DataTypeDescriptor::text(),
            )
            .unwrap();
        assert_eq!(text, "('n/a')");

        let varchar = translator
            .to_engine_text(
                &SqlExpressionDescriptor::Literal(SqlValue::Text("n/a".to_string())),
                "VARCHAR(10)",
                &DataTypeDescriptor::varchar(10),
            )
            .unwrap();
        assert_eq!(varchar, "'n/a'");
    }

    #[test]
    fn test_boolean_literal_coerced_from_int() {
        let translator = translator();
        let text = translator
            .to_engine_text(
                &SqlExpressionDescriptor::Literal(SqlValue::Int(1)),
                "TINYINT(1)",
                &DataTypeDescriptor::boolean(),
            )
            .unwrap();
        assert_eq!(text, "TRUE");
    }
}
