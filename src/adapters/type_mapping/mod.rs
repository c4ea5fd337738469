// 型マッピングサービス
//
// 方言に依存しない共通インターフェースで DataTypeDescriptor <-> ネイティブ型文字列 の
// 双方向変換を一元管理します。

pub mod common;
mod mysql_mapper;
mod postgres_mapper;
mod sqlite_mapper;

pub use mysql_mapper::MySqlTypeMapper;
pub use postgres_mapper::PostgresTypeMapper;
pub use sqlite_mapper::SqliteTypeMapper;

use crate::core::config::Dialect;
use crate::core::schema::DataTypeDescriptor;
use tracing::warn;

/// 型メタデータ
///
/// データベースから取得した型の追加情報を保持します。
#[derive(Debug, Clone, Default)]
pub struct TypeMetadata {
    /// 文字列型・バイナリ型の最大長
    pub char_max_length: Option<u32>,
    /// 数値型の精度
    pub numeric_precision: Option<u32>,
    /// 数値型の小数点以下桁数
    pub numeric_scale: Option<u32>,
    /// 完全な型定義（MySQLの `tinyint(1)` 等）
    pub column_type: Option<String>,
}

/// 方言固有の型マッピング
///
/// 各データベース方言固有の型変換ロジックを提供するトレイト。
pub trait TypeMapper: Send + Sync {
    /// ネイティブ型文字列から共通型へパース
    ///
    /// # Arguments
    /// * `native_type` - データベースから取得した型文字列
    /// * `metadata` - 追加メタデータ
    ///
    /// # Returns
    /// 変換された共通型、変換できない場合はNone
    fn parse_native_type(
        &self,
        native_type: &str,
        metadata: &TypeMetadata,
    ) -> Option<DataTypeDescriptor>;

    /// 共通型からDDL用のネイティブ型文字列へ変換
    fn format_native_type(&self, data_type: &DataTypeDescriptor) -> String;

    /// `CAST(expr AS <type>)` で使用する型文字列
    fn cast_type(&self, data_type: &DataTypeDescriptor) -> String {
        self.format_native_type(data_type)
    }

    /// デフォルト型（パース失敗時のフォールバック）
    fn default_type(&self) -> DataTypeDescriptor {
        DataTypeDescriptor::text()
    }
}

/// 型マッピングサービス
///
/// 方言に依存しない共通インターフェースで型変換を提供します。
pub struct TypeMappingService {
    dialect: Dialect,
    mapper: Box<dyn TypeMapper>,
}

impl Clone for TypeMappingService {
    fn clone(&self) -> Self {
        Self::new(self.dialect)
    }
}

impl std::fmt::Debug for TypeMappingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMappingService")
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl TypeMappingService {
    /// 新しいTypeMappingServiceを作成
    pub fn new(dialect: Dialect) -> Self {
        let mapper: Box<dyn TypeMapper> = match dialect {
            Dialect::PostgreSQL => Box::new(PostgresTypeMapper),
            Dialect::MySQL => Box::new(MySqlTypeMapper),
            Dialect::SQLite => Box::new(SqliteTypeMapper),
        };
        Self { dialect, mapper }
    }

    /// 方言を取得
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 共通型 -> ネイティブ型文字列
    ///
    /// # Returns
    /// ネイティブ型文字列（例: "VARCHAR(255)", "NUMERIC(10, 2)"）
    pub fn to_native_type(&self, data_type: &DataTypeDescriptor) -> String {
        self.mapper.format_native_type(data_type)
    }

    /// 共通型 -> CAST用の型文字列
    pub fn to_cast_type(&self, data_type: &DataTypeDescriptor) -> String {
        self.mapper.cast_type(data_type)
    }

    /// ネイティブ型文字列 -> 共通型
    ///
    /// 未知の型はデフォルト型（text）にフォールバックし、警告を出力します。
    pub fn from_native_type(
        &self,
        native_type: &str,
        metadata: &TypeMetadata,
    ) -> DataTypeDescriptor {
        self.mapper
            .parse_native_type(native_type, metadata)
            .unwrap_or_else(|| {
                let fallback = self.mapper.default_type();
                warn!(
                    dialect = %self.dialect,
                    native_type,
                    fallback = %fallback,
                    "Unknown native type, falling back"
                );
                fallback
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::DataTypeTag;

    #[test]
    fn test_new_service_dialect() {
        for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
            assert_eq!(TypeMappingService::new(dialect).dialect(), dialect);
        }
    }

    #[test]
    fn test_unknown_native_type_falls_back_to_text() {
        let service = TypeMappingService::new(Dialect::PostgreSQL);
        let parsed = service.from_native_type("tsvector", &TypeMetadata::default());
        assert_eq!(parsed.tag(), DataTypeTag::Text);
    }
}
