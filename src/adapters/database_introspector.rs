// データベースイントロスペクター
//
// データベースからスキーマ情報を取得するための抽象化レイヤー。
// 各方言固有のINFORMATION_SCHEMA/システムカタログ/PRAGMAクエリを実装します。
// Anyドライバーで確実にデコードできるよう、カタログの列はtext/bigintへキャストして取得します。

use crate::adapters::sql_quote::{quote_identifier_sqlite, quote_string_literal};
use crate::adapters::type_mapping::TypeMetadata;
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use async_trait::async_trait;
use regex::Regex;
use sqlx::any::AnyRow;
use sqlx::{Any, AnyPool, Row};
use std::sync::LazyLock;
use tracing::warn;

/// 生のテーブル情報
#[derive(Debug, Clone, PartialEq)]
pub struct RawTableInfo {
    /// スキーマ名（スキーマを持たない方言ではNone）
    pub schema: Option<String>,
    /// テーブル名
    pub name: String,
    /// テーブルコメント
    pub description: Option<String>,
}

/// 生のカラム情報（DB固有フォーマット）
///
/// データベースから取得したカラム情報を保持する構造体。
/// TypeMappingService で DataTypeDescriptor に変換されます。
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumnInfo {
    /// カラム名
    pub name: String,
    /// データ型（DB固有の型文字列）
    pub data_type: String,
    /// NULL許可フラグ
    pub is_nullable: bool,
    /// デフォルト値（エンジンのSQLテキスト）
    pub default_value: Option<String>,
    /// 文字型の最大長
    pub char_max_length: Option<u32>,
    /// 数値型の精度
    pub numeric_precision: Option<u32>,
    /// 数値型のスケール
    pub numeric_scale: Option<u32>,
    /// 完全な型定義（MySQLのCOLUMN_TYPE）
    pub column_type: Option<String>,
    /// 自動増分フラグ
    pub is_identity: bool,
}

impl RawColumnInfo {
    /// 型マッピング用のメタデータ
    pub fn metadata(&self) -> TypeMetadata {
        TypeMetadata {
            char_max_length: self.char_max_length,
            numeric_precision: self.numeric_precision,
            numeric_scale: self.numeric_scale,
            column_type: self.column_type.clone(),
        }
    }
}

/// 生のインデックス情報（DB固有フォーマット）
#[derive(Debug, Clone, PartialEq)]
pub struct RawIndexInfo {
    /// インデックス名
    pub name: String,
    /// インデックス対象のカラム
    pub columns: Vec<String>,
    /// ユニーク制約フラグ
    pub unique: bool,
}

/// 生の外部キー情報
#[derive(Debug, Clone, PartialEq)]
pub struct RawForeignKeyInfo {
    /// 制約名
    pub name: String,
    /// 参照元カラム
    pub columns: Vec<String>,
    /// 参照先スキーマ
    pub referenced_schema: Option<String>,
    /// 参照先テーブル
    pub referenced_table: String,
    /// 参照先カラム
    pub referenced_columns: Vec<String>,
}

/// データベーススキーマ取得インターフェース
///
/// 各データベース方言固有のイントロスペクション処理を抽象化します。
#[async_trait]
pub trait DatabaseIntrospector: Send + Sync {
    /// ユーザースキーマ名一覧を取得（スキーマを持たない方言では空）
    async fn get_schema_names(&self, pool: &AnyPool) -> Result<Vec<String>, DatabaseError>;

    /// テーブル一覧を取得
    async fn get_tables(&self, pool: &AnyPool) -> Result<Vec<RawTableInfo>, DatabaseError>;

    /// カラム情報を取得（定義順）
    async fn get_columns(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawColumnInfo>, DatabaseError>;

    /// プライマリキーのカラムを取得（キー順）
    async fn get_primary_key(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<String>, DatabaseError>;

    /// セカンダリインデックスを取得
    async fn get_indexes(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawIndexInfo>, DatabaseError>;

    /// 外部キーを取得
    async fn get_foreign_keys(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawForeignKeyInfo>, DatabaseError>;
}

/// PostgreSQL用イントロスペクター
pub struct PostgresIntrospector;

/// MySQL用イントロスペクター
pub struct MySqlIntrospector;

/// SQLite用イントロスペクター
pub struct SqliteIntrospector;

/// 方言に応じたイントロスペクターを作成
pub fn create_introspector(dialect: Dialect) -> Box<dyn DatabaseIntrospector> {
    match dialect {
        Dialect::PostgreSQL => Box::new(PostgresIntrospector),
        Dialect::MySQL => Box::new(MySqlIntrospector),
        Dialect::SQLite => Box::new(SqliteIntrospector),
    }
}

async fn fetch_all(
    pool: &AnyPool,
    sql: &str,
    binds: &[&str],
) -> Result<Vec<AnyRow>, DatabaseError> {
    let mut query = sqlx::query(sql);
    for bind in binds {
        query = query.bind(bind.to_string());
    }
    query.fetch_all(pool).await.map_err(|e| {
        DatabaseError::query(
            format!("スキーマ情報の取得に失敗しました: {}", e),
            sql.trim(),
        )
    })
}

fn column<'r, T>(row: &'r AnyRow, index: usize) -> Result<T, DatabaseError>
where
    T: sqlx::Decode<'r, Any> + sqlx::Type<Any>,
{
    row.try_get(index).map_err(|e| DatabaseError::Query {
        message: format!("スキーマ情報の読み取りに失敗しました (column {}): {}", index, e),
        sql: None,
    })
}

fn optional_u32(row: &AnyRow, index: usize) -> Result<Option<u32>, DatabaseError> {
    let value: Option<i64> = column(row, index)?;
    Ok(value.and_then(|v| u32::try_from(v).ok()))
}

/// 名前ごとに連続した行をまとめる（SQL側で名前順に並べておくこと）
fn push_grouped<'g, T>(
    groups: &'g mut Vec<T>,
    name: &str,
    name_of: impl Fn(&T) -> &str,
    create: impl FnOnce() -> T,
) -> &'g mut T {
    let is_same = groups.last().map(|g| name_of(g) == name).unwrap_or(false);
    if !is_same {
        groups.push(create());
    }
    let index = groups.len() - 1;
    &mut groups[index]
}

fn schema_of(table: &RawTableInfo) -> &str {
    table.schema.as_deref().unwrap_or("public")
}

// =============================================================================
// PostgreSQL イントロスペクター実装
// =============================================================================

#[async_trait]
impl DatabaseIntrospector for PostgresIntrospector {
    async fn get_schema_names(&self, pool: &AnyPool) -> Result<Vec<String>, DatabaseError> {
        let sql = r#"
            SELECT schema_name::text
            FROM information_schema.schemata
            WHERE schema_name NOT IN ('pg_catalog', 'information_schema')
                AND schema_name NOT LIKE 'pg_toast%'
                AND schema_name NOT LIKE 'pg_temp%'
            ORDER BY schema_name
        "#;

        let rows = fetch_all(pool, sql, &[]).await?;
        rows.iter().map(|row| column(row, 0)).collect()
    }

    async fn get_tables(&self, pool: &AnyPool) -> Result<Vec<RawTableInfo>, DatabaseError> {
        let sql = r#"
            SELECT n.nspname::text, c.relname::text, obj_description(c.oid, 'pg_class')::text
            FROM pg_class c
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE c.relkind IN ('r', 'p')
                AND NOT c.relispartition
                AND n.nspname NOT IN ('pg_catalog', 'information_schema')
                AND n.nspname NOT LIKE 'pg_toast%'
            ORDER BY n.nspname, c.relname
        "#;

        let rows = fetch_all(pool, sql, &[]).await?;
        rows.iter()
            .map(|row| -> Result<RawTableInfo, DatabaseError> {
                Ok(RawTableInfo {
                    schema: Some(column(row, 0)?),
                    name: column(row, 1)?,
                    description: column(row, 2)?,
                })
            })
            .collect()
    }

    async fn get_columns(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawColumnInfo>, DatabaseError> {
        let sql = r#"
            SELECT
                column_name::text,
                data_type::text,
                is_nullable::text,
                column_default::text,
                character_maximum_length::int8,
                numeric_precision::int8,
                numeric_scale::int8,
                udt_name::text,
                is_identity::text
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#;

        let rows = fetch_all(pool, sql, &[schema_of(table), table.name.as_str()]).await?;

        rows.iter()
            .map(|row| -> Result<RawColumnInfo, DatabaseError> {
                let default_value: Option<String> = column(row, 3)?;
                let is_identity: Option<String> = column(row, 8)?;

                // serial列は nextval('seq') をデフォルトに持つ
                let is_serial = default_value
                    .as_deref()
                    .map(|d| d.starts_with("nextval("))
                    .unwrap_or(false);
                let is_identity = is_serial || is_identity.as_deref() == Some("YES");

                Ok(RawColumnInfo {
                    name: column(row, 0)?,
                    data_type: column(row, 1)?,
                    is_nullable: column::<String>(row, 2)? == "YES",
                    default_value: if is_identity { None } else { default_value },
                    char_max_length: optional_u32(row, 4)?,
                    numeric_precision: optional_u32(row, 5)?,
                    numeric_scale: optional_u32(row, 6)?,
                    column_type: column(row, 7)?,
                    is_identity,
                })
            })
            .collect()
    }

    async fn get_primary_key(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<String>, DatabaseError> {
        let sql = r#"
            SELECT a.attname::text
            FROM pg_index i
            JOIN pg_class c ON c.oid = i.indrelid
            JOIN pg_namespace n ON n.oid = c.relnamespace
            CROSS JOIN LATERAL unnest(i.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
            JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = k.attnum
            WHERE i.indisprimary
                AND n.nspname = $1
                AND c.relname = $2
            ORDER BY k.ord
        "#;

        let rows = fetch_all(pool, sql, &[schema_of(table), table.name.as_str()]).await?;
        rows.iter().map(|row| column(row, 0)).collect()
    }

    async fn get_indexes(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawIndexInfo>, DatabaseError> {
        // 式インデックスと部分インデックスは共通モデルで表現できないため対象外
        let sql = r#"
            SELECT i.relname::text, a.attname::text, ix.indisunique
            FROM pg_index ix
            JOIN pg_class t ON t.oid = ix.indrelid
            JOIN pg_class i ON i.oid = ix.indexrelid
            JOIN pg_namespace n ON n.oid = t.relnamespace
            CROSS JOIN LATERAL unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
            JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
            WHERE n.nspname = $1
                AND t.relname = $2
                AND NOT ix.indisprimary
                AND ix.indpred IS NULL
                AND 0 <> ALL (ix.indkey::int2[])
            ORDER BY i.relname, k.ord
        "#;

        let rows = fetch_all(pool, sql, &[schema_of(table), table.name.as_str()]).await?;

        let mut indexes: Vec<RawIndexInfo> = Vec::new();
        for row in &rows {
            let index_name: String = column(row, 0)?;
            let column_name: String = column(row, 1)?;
            let unique: bool = column(row, 2)?;

            let index = push_grouped(&mut indexes, &index_name, |i| i.name.as_str(), || RawIndexInfo {
                name: index_name.clone(),
                columns: Vec::new(),
                unique,
            });
            index.columns.push(column_name);
        }

        Ok(indexes)
    }

    async fn get_foreign_keys(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawForeignKeyInfo>, DatabaseError> {
        // 制約名でグループ化して、同一テーブルへの複数FKを正しく区別する
        let sql = r#"
            SELECT
                con.conname::text,
                a.attname::text,
                rn.nspname::text,
                rc.relname::text,
                ra.attname::text
            FROM pg_constraint con
            JOIN pg_class t ON t.oid = con.conrelid
            JOIN pg_namespace n ON n.oid = t.relnamespace
            JOIN pg_class rc ON rc.oid = con.confrelid
            JOIN pg_namespace rn ON rn.oid = rc.relnamespace
            CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(attnum, ref_attnum, ord)
            JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
            JOIN pg_attribute ra ON ra.attrelid = con.confrelid AND ra.attnum = k.ref_attnum
            WHERE con.contype = 'f'
                AND n.nspname = $1
                AND t.relname = $2
            ORDER BY con.conname, k.ord
        "#;

        let rows = fetch_all(pool, sql, &[schema_of(table), table.name.as_str()]).await?;

        let mut foreign_keys: Vec<RawForeignKeyInfo> = Vec::new();
        for row in &rows {
            let constraint_name: String = column(row, 0)?;
            let column_name: String = column(row, 1)?;
            let referenced_schema: String = column(row, 2)?;
            let referenced_table: String = column(row, 3)?;
            let referenced_column: String = column(row, 4)?;

            let foreign_key = push_grouped(
                &mut foreign_keys,
                &constraint_name,
                |f| f.name.as_str(),
                || RawForeignKeyInfo {
                    name: constraint_name.clone(),
                    columns: Vec::new(),
                    referenced_schema: Some(referenced_schema),
                    referenced_table,
                    referenced_columns: Vec::new(),
                },
            );
            foreign_key.columns.push(column_name);
            foreign_key.referenced_columns.push(referenced_column);
        }

        Ok(foreign_keys)
    }
}

// =============================================================================
// MySQL イントロスペクター実装
// =============================================================================

/// 式として解釈すべきMySQLのデフォルト値
static MYSQL_FUNCTION_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(current_timestamp|now|localtimestamp|curdate|current_date)(\(\d*\))?$")
        .expect("valid regex")
});

/// MySQLのCOLUMN_DEFAULTをSQL式のテキストへ正規化
///
/// MySQL 8はリテラルのデフォルト値を引用符なしで返すため、式でないものはクォートします。
/// MariaDBはすでにクォート済みの値を返します。
pub fn normalize_mysql_default(default_value: Option<String>, extra: &str) -> Option<String> {
    let value = default_value?;
    let trimmed = value.trim();

    if extra.to_ascii_uppercase().contains("DEFAULT_GENERATED")
        || trimmed.starts_with('\'')
        || trimmed.eq_ignore_ascii_case("NULL")
        || MYSQL_FUNCTION_DEFAULT.is_match(trimmed)
    {
        return Some(value);
    }

    Some(quote_string_literal(&value))
}

#[async_trait]
impl DatabaseIntrospector for MySqlIntrospector {
    async fn get_schema_names(&self, _pool: &AnyPool) -> Result<Vec<String>, DatabaseError> {
        Ok(Vec::new())
    }

    async fn get_tables(&self, pool: &AnyPool) -> Result<Vec<RawTableInfo>, DatabaseError> {
        let sql = r#"
            SELECT CAST(table_name AS CHAR), CAST(table_comment AS CHAR)
            FROM information_schema.tables
            WHERE table_schema = DATABASE()
                AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let rows = fetch_all(pool, sql, &[]).await?;
        rows.iter()
            .map(|row| -> Result<RawTableInfo, DatabaseError> {
                let comment: Option<String> = column(row, 1)?;
                Ok(RawTableInfo {
                    schema: None,
                    name: column(row, 0)?,
                    description: comment.filter(|c| !c.is_empty()),
                })
            })
            .collect()
    }

    async fn get_columns(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawColumnInfo>, DatabaseError> {
        let sql = r#"
            SELECT
                CAST(column_name AS CHAR),
                CAST(data_type AS CHAR),
                CAST(is_nullable AS CHAR),
                CAST(column_default AS CHAR),
                CAST(character_maximum_length AS SIGNED),
                CAST(numeric_precision AS SIGNED),
                CAST(numeric_scale AS SIGNED),
                CAST(column_type AS CHAR),
                CAST(extra AS CHAR)
            FROM information_schema.columns
            WHERE table_name = ? AND table_schema = DATABASE()
            ORDER BY ordinal_position
        "#;

        let rows = fetch_all(pool, sql, &[table.name.as_str()]).await?;

        rows.iter()
            .map(|row| -> Result<RawColumnInfo, DatabaseError> {
                let extra: Option<String> = column(row, 8)?;
                let extra = extra.unwrap_or_default();
                let is_identity = extra.to_ascii_lowercase().contains("auto_increment");
                let default_value = normalize_mysql_default(column(row, 3)?, &extra);

                Ok(RawColumnInfo {
                    name: column(row, 0)?,
                    data_type: column(row, 1)?,
                    is_nullable: column::<String>(row, 2)? == "YES",
                    default_value: if is_identity { None } else { default_value },
                    char_max_length: optional_u32(row, 4)?,
                    numeric_precision: optional_u32(row, 5)?,
                    numeric_scale: optional_u32(row, 6)?,
                    column_type: column(row, 7)?,
                    is_identity,
                })
            })
            .collect()
    }

    async fn get_primary_key(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<String>, DatabaseError> {
        let sql = r#"
            SELECT CAST(column_name AS CHAR)
            FROM information_schema.statistics
            WHERE table_name = ? AND table_schema = DATABASE()
                AND index_name = 'PRIMARY'
            ORDER BY seq_in_index
        "#;

        let rows = fetch_all(pool, sql, &[table.name.as_str()]).await?;
        rows.iter().map(|row| column(row, 0)).collect()
    }

    async fn get_indexes(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawIndexInfo>, DatabaseError> {
        let sql = r#"
            SELECT
                CAST(index_name AS CHAR),
                CAST(column_name AS CHAR),
                CAST(non_unique AS SIGNED)
            FROM information_schema.statistics
            WHERE table_name = ? AND table_schema = DATABASE()
                AND index_name != 'PRIMARY'
                AND column_name IS NOT NULL
            ORDER BY index_name, seq_in_index
        "#;

        let rows = fetch_all(pool, sql, &[table.name.as_str()]).await?;

        let mut indexes: Vec<RawIndexInfo> = Vec::new();
        for row in &rows {
            let index_name: String = column(row, 0)?;
            let column_name: String = column(row, 1)?;
            let non_unique: i64 = column(row, 2)?;

            let index = push_grouped(&mut indexes, &index_name, |i| i.name.as_str(), || RawIndexInfo {
                name: index_name.clone(),
                columns: Vec::new(),
                unique: non_unique == 0,
            });
            index.columns.push(column_name);
        }

        Ok(indexes)
    }

    async fn get_foreign_keys(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawForeignKeyInfo>, DatabaseError> {
        let sql = r#"
            SELECT
                CAST(constraint_name AS CHAR),
                CAST(column_name AS CHAR),
                CAST(referenced_table_name AS CHAR),
                CAST(referenced_column_name AS CHAR)
            FROM information_schema.key_column_usage
            WHERE table_name = ? AND table_schema = DATABASE()
                AND referenced_table_name IS NOT NULL
            ORDER BY constraint_name, ordinal_position
        "#;

        let rows = fetch_all(pool, sql, &[table.name.as_str()]).await?;

        let mut foreign_keys: Vec<RawForeignKeyInfo> = Vec::new();
        for row in &rows {
            let constraint_name: String = column(row, 0)?;
            let column_name: String = column(row, 1)?;
            let referenced_table: String = column(row, 2)?;
            let referenced_column: String = column(row, 3)?;

            let foreign_key = push_grouped(
                &mut foreign_keys,
                &constraint_name,
                |f| f.name.as_str(),
                || RawForeignKeyInfo {
                    name: constraint_name.clone(),
                    columns: Vec::new(),
                    referenced_schema: None,
                    referenced_table,
                    referenced_columns: Vec::new(),
                },
            );
            foreign_key.columns.push(column_name);
            foreign_key.referenced_columns.push(referenced_column);
        }

        Ok(foreign_keys)
    }
}

// =============================================================================
// SQLite イントロスペクター実装
// =============================================================================

impl SqliteIntrospector {
    /// テーブル定義がAUTOINCREMENTを含むかどうか
    async fn has_autoincrement(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<bool, DatabaseError> {
        let sql = "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?";
        let rows = fetch_all(pool, sql, &[table.name.as_str()]).await?;

        match rows.first() {
            Some(row) => {
                let definition: Option<String> = column(row, 0)?;
                Ok(definition
                    .map(|d| d.to_ascii_uppercase().contains("AUTOINCREMENT"))
                    .unwrap_or(false))
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl DatabaseIntrospector for SqliteIntrospector {
    async fn get_schema_names(&self, _pool: &AnyPool) -> Result<Vec<String>, DatabaseError> {
        Ok(Vec::new())
    }

    async fn get_tables(&self, pool: &AnyPool) -> Result<Vec<RawTableInfo>, DatabaseError> {
        let sql = r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table'
                AND name NOT LIKE 'sqlite_%'
            ORDER BY name
        "#;

        let rows = fetch_all(pool, sql, &[]).await?;
        rows.iter()
            .map(|row| -> Result<RawTableInfo, DatabaseError> {
                Ok(RawTableInfo {
                    schema: None,
                    name: column(row, 0)?,
                    description: None,
                })
            })
            .collect()
    }

    async fn get_columns(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawColumnInfo>, DatabaseError> {
        let sql = format!("PRAGMA table_info({})", quote_identifier_sqlite(&table.name));
        let rows = fetch_all(pool, &sql, &[]).await?;

        let pk_count = rows
            .iter()
            .map(|row| column::<i64>(row, 5))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|pk| *pk > 0)
            .count();
        let autoincrement = pk_count == 1 && self.has_autoincrement(pool, table).await?;

        rows.iter()
            .map(|row| -> Result<RawColumnInfo, DatabaseError> {
                let data_type: String = column(row, 2)?;
                let not_null: i64 = column(row, 3)?;
                let pk: i64 = column(row, 5)?;
                let is_identity =
                    autoincrement && pk > 0 && data_type.eq_ignore_ascii_case("INTEGER");

                Ok(RawColumnInfo {
                    name: column(row, 1)?,
                    // 宣言型の解析はマッパー側で行う
                    column_type: Some(data_type.clone()),
                    data_type,
                    // INTEGER PRIMARY KEY は暗黙的にNOT NULL
                    is_nullable: not_null == 0 && !is_identity,
                    default_value: column(row, 4)?,
                    char_max_length: None,
                    numeric_precision: None,
                    numeric_scale: None,
                    is_identity,
                })
            })
            .collect()
    }

    async fn get_primary_key(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<String>, DatabaseError> {
        let sql = format!("PRAGMA table_info({})", quote_identifier_sqlite(&table.name));
        let rows = fetch_all(pool, &sql, &[]).await?;

        // pk列はキー内の位置（1始まり）、0はキー外
        let mut pk_columns: Vec<(i64, String)> = Vec::new();
        for row in &rows {
            let pk: i64 = column(row, 5)?;
            if pk > 0 {
                pk_columns.push((pk, column(row, 1)?));
            }
        }
        pk_columns.sort_by_key(|(position, _)| *position);

        Ok(pk_columns.into_iter().map(|(_, name)| name).collect())
    }

    async fn get_indexes(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawIndexInfo>, DatabaseError> {
        let sql = format!("PRAGMA index_list({})", quote_identifier_sqlite(&table.name));
        let rows = fetch_all(pool, &sql, &[]).await?;

        let mut indexes = Vec::new();

        for row in &rows {
            let index_name: String = column(row, 1)?;
            let is_unique: i64 = column(row, 2)?;
            let origin: String = column(row, 3)?;
            let partial: i64 = column(row, 4)?;

            // システムインデックス・PK由来・部分インデックスをスキップ
            if index_name.starts_with("sqlite_") || origin == "pk" || partial != 0 {
                continue;
            }

            let info_sql = format!("PRAGMA index_info({})", quote_identifier_sqlite(&index_name));
            let info_rows = fetch_all(pool, &info_sql, &[]).await?;

            let columns = info_rows
                .iter()
                .map(|r| column::<Option<String>>(r, 2))
                .collect::<Result<Option<Vec<String>>, _>>();

            match columns? {
                Some(columns) => indexes.push(RawIndexInfo {
                    name: index_name,
                    columns,
                    unique: is_unique == 1,
                }),
                None => warn!(
                    table = %table.name,
                    index = %index_name,
                    "Skipping expression index"
                ),
            }
        }

        Ok(indexes)
    }

    async fn get_foreign_keys(
        &self,
        pool: &AnyPool,
        table: &RawTableInfo,
    ) -> Result<Vec<RawForeignKeyInfo>, DatabaseError> {
        let sql = format!(
            "PRAGMA foreign_key_list({})",
            quote_identifier_sqlite(&table.name)
        );
        let rows = fetch_all(pool, &sql, &[]).await?;

        // SQLiteの外部キーは名前を持たないため、id ごとに名前を付ける
        let mut foreign_keys: Vec<RawForeignKeyInfo> = Vec::new();
        let mut implicit_targets: Vec<usize> = Vec::new();
        for row in &rows {
            let id: i64 = column(row, 0)?;
            let referenced_table: String = column(row, 2)?;
            let column_name: String = column(row, 3)?;
            let referenced_column: Option<String> = column(row, 4)?;

            let name = format!("fk_{}_{}", table.name, id);
            let foreign_key = push_grouped(&mut foreign_keys, &name, |f| f.name.as_str(), || {
                RawForeignKeyInfo {
                    name: name.clone(),
                    columns: Vec::new(),
                    referenced_schema: None,
                    referenced_table,
                    referenced_columns: Vec::new(),
                }
            });
            foreign_key.columns.push(column_name);
            match referenced_column {
                Some(referenced_column) => foreign_key.referenced_columns.push(referenced_column),
                None => implicit_targets.push(foreign_keys.len() - 1),
            }
        }

        // 参照先カラム省略時は参照先テーブルのプライマリキーを参照する
        implicit_targets.dedup();
        for index in implicit_targets {
            let referenced = RawTableInfo {
                schema: None,
                name: foreign_keys[index].referenced_table.clone(),
                description: None,
            };
            foreign_keys[index].referenced_columns = self.get_primary_key(pool, &referenced).await?;
        }

        Ok(foreign_keys)
    }
}
