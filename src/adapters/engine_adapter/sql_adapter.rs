// SQLエンジンアダプター
//
// SQLxのAnyドライバー上で、イントロスペクター・SQLジェネレーター・値表現・式変換を
// 組み合わせて EngineAdapter を実装します。PostgreSQL、MySQL、SQLiteで共通です。

use super::{EngineAdapter, MetadataPhase, SqlEvaluator, StatementExecutor};
use crate::adapters::connection::DatabaseConnectionService;
use crate::adapters::connection_string::is_sqlite_memory;
use crate::adapters::database_introspector::{
    create_introspector, DatabaseIntrospector, RawTableInfo,
};
use crate::adapters::expression_translator::{
    create_expression_translator, ExpressionTranslator, EVALUATED_COLUMN,
};
use crate::adapters::sql_generator::{create_sql_generator, ColumnDefinition, SqlGenerator};
use crate::adapters::type_mapping::TypeMappingService;
use crate::adapters::value_representer::{create_representer, ValueRepresenter};
use crate::core::config::{DatabaseConfig, Dialect};
use crate::core::error::{DatabaseError, MigrationError, UnsupportedOperationError};
use crate::core::schema::{
    ColumnDescriptor, DataTypeDescriptor, DataTypeTag, DatabaseDescriptor, ForeignKeyDescriptor,
    IndexDescriptor, SchemaDescriptor, TableDescriptor,
};
use crate::core::value::{PageInfo, Row, RowBatch, SqlValue};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row as _};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// SQLエンジンアダプター
pub struct SqlEngineAdapter {
    dialect: Dialect,
    config: DatabaseConfig,
    pool: Option<AnyPool>,
    connections: DatabaseConnectionService,
    types: TypeMappingService,
    representer: Arc<dyn ValueRepresenter>,
    translator: Box<dyn ExpressionTranslator>,
    generator: Box<dyn SqlGenerator>,
    introspector: Box<dyn DatabaseIntrospector>,
}

impl std::fmt::Debug for SqlEngineAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlEngineAdapter")
            .field("dialect", &self.dialect)
            .field("database", &self.config.database)
            .field("connected", &self.pool.is_some())
            .finish()
    }
}

impl SqlEngineAdapter {
    /// 新しいSqlEngineAdapterを作成
    ///
    /// # Arguments
    ///
    /// * `dialect` - データベース方言
    /// * `config` - 接続設定
    /// * `pool` - 接続プール（Noneの場合はSQL生成のみ可能）
    pub fn new(dialect: Dialect, config: DatabaseConfig, pool: Option<AnyPool>) -> Self {
        let representer = create_representer(dialect);
        Self {
            dialect,
            config,
            pool,
            connections: DatabaseConnectionService::new(),
            types: TypeMappingService::new(dialect),
            translator: create_expression_translator(dialect, Arc::clone(&representer)),
            representer,
            generator: create_sql_generator(dialect),
            introspector: create_introspector(dialect),
        }
    }

    /// 遅延接続のプールを持つアダプターを作成
    ///
    /// 接続は最初のクエリ実行時に確立されるため、データベース作成前でも構築できます。
    pub fn connect_lazy(dialect: Dialect, config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseConnectionService::new().create_lazy_pool(dialect, config)?;
        Ok(Self::new(dialect, config.clone(), Some(pool)))
    }

    /// 接続を持たないアダプターを作成（ダンプ出力の描画用）
    pub fn offline(dialect: Dialect) -> Self {
        let config = DatabaseConfig {
            engine: dialect.to_string(),
            host: String::new(),
            port: None,
            database: String::new(),
            user: None,
            password: None,
            timeout: None,
        };
        Self::new(dialect, config, None)
    }

    /// 接続プールを取得
    pub fn pool(&self) -> Result<&AnyPool, DatabaseError> {
        self.pool.as_ref().ok_or_else(|| DatabaseError::Connection {
            message: format!("接続を持たないアダプターです: {}", self.dialect),
            cause: "adapter is offline".to_string(),
        })
    }

    /// 接続プールを閉じる
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            self.connections.close_pool(pool).await;
        }
    }

    /// 記述子のカラムを方言のテキストへ解決
    ///
    /// ターゲットで表現できないデフォルト関数は警告を出して省略します。
    fn column_definitions(
        &self,
        table: &TableDescriptor,
    ) -> Result<Vec<ColumnDefinition>, MigrationError> {
        table
            .columns
            .iter()
            .map(|column| {
                let native_type = self.types.to_native_type(&column.data_type);
                let default = match &column.default_value {
                    Some(expression) => match self.translator.to_engine_text(
                        expression,
                        &native_type,
                        &column.data_type,
                    ) {
                        Ok(text) => Some(text),
                        Err(e) if e.is_unsupported_function() => {
                            warn!(
                                table = %table.display_name(),
                                column = %column.name,
                                error = %e,
                                "Default value is not supported by target, omitting"
                            );
                            None
                        }
                        Err(e) => return Err(MigrationError::from(e).in_table(table.display_name())),
                    },
                    None => None,
                };

                Ok(ColumnDefinition {
                    name: column.name.clone(),
                    native_type,
                    nullable: column.nullable,
                    default,
                    identity: column.identity,
                })
            })
            .collect()
    }

    /// バッチの値をカラム型に合わせてリテラル化
    fn render_literals(&self, table: &TableDescriptor, batch: &RowBatch) -> Vec<Vec<String>> {
        let column_types: Vec<Option<&DataTypeDescriptor>> = batch
            .columns()
            .iter()
            .map(|name| table.get_column(name).map(|c| &c.data_type))
            .collect();

        batch
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&column_types)
                    .map(|(value, data_type)| match data_type {
                        Some(data_type) => self.representer.represent_typed(value, data_type),
                        None => self.representer.literal(value),
                    })
                    .collect()
            })
            .collect()
    }

    fn decode_row(&self, row: &AnyRow, columns: &[ColumnDescriptor]) -> Result<Row, MigrationError> {
        columns
            .iter()
            .enumerate()
            .map(|(index, column)| self.decode_cell(row, index, column))
            .collect()
    }

    /// 読み出し式（read_expression）で正規化された列を共通の値へ変換
    fn decode_cell(
        &self,
        row: &AnyRow,
        index: usize,
        column: &ColumnDescriptor,
    ) -> Result<SqlValue, MigrationError> {
        let decode_error = |e: sqlx::Error| {
            MigrationError::Database(DatabaseError::Query {
                message: format!("カラム '{}' の値を読み取れません: {}", column.name, e),
                sql: None,
            })
        };

        let data_type = &column.data_type;
        let tag = data_type.tag();
        let value = match tag {
            // MySQL・SQLiteの真偽値は整数として返る
            DataTypeTag::Boolean => match row.try_get::<Option<bool>, _>(index) {
                Ok(value) => value.map(SqlValue::Bool),
                Err(_) => row
                    .try_get::<Option<i64>, _>(index)
                    .map_err(decode_error)?
                    .map(|i| SqlValue::Bool(i != 0)),
            },
            _ if tag.is_integer() => row
                .try_get::<Option<i64>, _>(index)
                .map_err(decode_error)?
                .map(SqlValue::Int),
            DataTypeTag::Real | DataTypeTag::Double => row
                .try_get::<Option<f64>, _>(index)
                .map_err(decode_error)?
                .map(SqlValue::Float),
            _ if tag.is_binary() => row
                .try_get::<Option<Vec<u8>>, _>(index)
                .map_err(decode_error)?
                .map(SqlValue::Bytes),
            _ if tag.is_textual() => row
                .try_get::<Option<String>, _>(index)
                .map_err(decode_error)?
                .map(SqlValue::Text),
            _ => match row
                .try_get::<Option<String>, _>(index)
                .map_err(decode_error)?
            {
                Some(text) => Some(self.representer.parse_text(&text, data_type)?),
                None => None,
            },
        };

        Ok(value.unwrap_or(SqlValue::Null))
    }

    async fn describe_table(
        &self,
        pool: &AnyPool,
        raw: &RawTableInfo,
        cancel: &CancellationToken,
    ) -> Result<TableDescriptor, MigrationError> {
        let raw_columns =
            cancellable("get_columns", cancel, self.introspector.get_columns(pool, raw)).await?;

        let mut table = TableDescriptor::new(raw.name.as_str());
        table.schema = raw.schema.clone();
        table.description = raw.description.clone();

        for raw_column in &raw_columns {
            let data_type = self
                .types
                .from_native_type(&raw_column.data_type, &raw_column.metadata());
            let default_value = match &raw_column.default_value {
                Some(text) => {
                    self.translator
                        .to_common_expression(text, &data_type, self, cancel)
                        .await?
                }
                None => None,
            };

            table.add_column(ColumnDescriptor {
                name: raw_column.name.clone(),
                data_type,
                nullable: raw_column.is_nullable,
                default_value,
                identity: raw_column.is_identity,
            });
        }

        table.primary_key = cancellable(
            "get_primary_key",
            cancel,
            self.introspector.get_primary_key(pool, raw),
        )
        .await?;

        table.indexes = cancellable("get_indexes", cancel, self.introspector.get_indexes(pool, raw))
            .await?
            .into_iter()
            .map(|index| IndexDescriptor {
                name: index.name,
                columns: index.columns,
                unique: index.unique,
            })
            .collect();

        table.foreign_keys = cancellable(
            "get_foreign_keys",
            cancel,
            self.introspector.get_foreign_keys(pool, raw),
        )
        .await?
        .into_iter()
        .map(|fk| ForeignKeyDescriptor {
            name: fk.name,
            columns: fk.columns,
            referenced_schema: fk.referenced_schema,
            referenced_table: fk.referenced_table,
            referenced_columns: fk.referenced_columns,
        })
        .collect();

        Ok(table)
    }

    async fn apply_statements(
        &self,
        statements: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError> {
        for sql in &statements {
            debug!(dialect = %self.dialect, %sql, "Applying metadata statement");
            self.execute(sql, cancel).await?;
        }
        Ok(())
    }

    /// サーバーレベルの接続でSQLを実行（データベース作成/削除用）
    async fn execute_on_server(
        &self,
        operation: &str,
        sql: &str,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError> {
        let server_pool = cancellable(
            operation,
            cancel,
            self.connections.create_server_pool(self.dialect, &self.config),
        )
        .await?;

        let result = cancellable(operation, cancel, async {
            sqlx::raw_sql(sql)
                .execute(&server_pool)
                .await
                .map(|_| ())
                .map_err(|e| DatabaseError::query(format!("{} に失敗しました: {}", operation, e), sql))
        })
        .await;

        self.connections.close_pool(&server_pool).await;
        result.map_err(MigrationError::from)
    }
}

/// キャンセルされた場合は処理を打ち切ってエラーを返す
async fn cancellable<T, F>(
    operation: &str,
    cancel: &CancellationToken,
    future: F,
) -> Result<T, DatabaseError>
where
    F: Future<Output = Result<T, DatabaseError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DatabaseError::Cancelled {
            operation: operation.to_string(),
        }),
        result = future => result,
    }
}

#[async_trait]
impl StatementExecutor for SqlEngineAdapter {
    async fn execute(&self, sql: &str, cancel: &CancellationToken) -> Result<u64, DatabaseError> {
        let pool = self.pool()?;
        cancellable("execute", cancel, async {
            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map(|result| result.rows_affected())
                .map_err(|e| DatabaseError::query(format!("SQLの実行に失敗しました: {}", e), sql))
        })
        .await
    }
}

#[async_trait]
impl SqlEvaluator for SqlEngineAdapter {
    /// 評価用SELECTを読み出し式で包み、行の読み出しと同じ規則で値を取得
    async fn evaluate_scalar(
        &self,
        sql: &str,
        data_type: &DataTypeDescriptor,
        cancel: &CancellationToken,
    ) -> Result<SqlValue, DatabaseError> {
        let pool = self.pool()?;
        let column = ColumnDescriptor::new(EVALUATED_COLUMN, data_type.clone(), true);
        let wrapped = format!(
            "SELECT {} FROM ({}) AS evaluated",
            self.generator.read_expression(&column),
            sql
        );

        let row = cancellable("evaluate_scalar", cancel, async {
            sqlx::query(&wrapped)
                .fetch_one(pool)
                .await
                .map_err(|e| {
                    DatabaseError::query(format!("式の評価に失敗しました: {}", e), wrapped.as_str())
                })
        })
        .await?;

        self.decode_cell(&row, 0, &column).map_err(|e| match e {
            MigrationError::Database(inner) => inner,
            other => DatabaseError::query(other.to_string(), wrapped.as_str()),
        })
    }
}

#[async_trait]
impl EngineAdapter for SqlEngineAdapter {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn get_database_descriptor(
        &self,
        cancel: &CancellationToken,
    ) -> Result<DatabaseDescriptor, MigrationError> {
        let pool = self.pool()?;
        info!(dialect = %self.dialect, database = %self.config.database, "Reading database structure");

        let schema_names =
            cancellable("get_schema_names", cancel, self.introspector.get_schema_names(pool))
                .await?;
        let raw_tables =
            cancellable("get_tables", cancel, self.introspector.get_tables(pool)).await?;

        let mut tables = Vec::with_capacity(raw_tables.len());
        for raw in &raw_tables {
            let display_name = match &raw.schema {
                Some(schema) => format!("{}.{}", schema, raw.name),
                None => raw.name.clone(),
            };
            let table = self
                .describe_table(pool, raw, cancel)
                .await
                .map_err(|e| e.in_table(display_name))?;
            debug!(
                table = %table.display_name(),
                columns = table.columns.len(),
                indexes = table.indexes.len(),
                foreign_keys = table.foreign_keys.len(),
                "Described table"
            );
            tables.push(table);
        }

        // テーブルを持つスキーマだけを対象にする
        let schemas = schema_names
            .into_iter()
            .filter(|name| tables.iter().any(|t| t.schema.as_deref() == Some(name.as_str())))
            .map(SchemaDescriptor::new)
            .collect();

        Ok(DatabaseDescriptor::new(schemas, tables))
    }

    async fn create_database(&self, cancel: &CancellationToken) -> Result<(), MigrationError> {
        if self.dialect == Dialect::SQLite {
            if is_sqlite_memory(&self.config.database) {
                return Ok(());
            }
            info!(path = %self.config.database, "Creating SQLite database file");
            tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.config.database)
                .await?;
            return Ok(());
        }

        let sql = self
            .generator
            .generate_create_database(&self.config.database)
            .ok_or_else(|| UnsupportedOperationError::new("create_database", self.dialect))?;
        info!(dialect = %self.dialect, database = %self.config.database, "Creating database");
        self.execute_on_server("create_database", &sql, cancel).await
    }

    async fn drop_database_if_exists(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError> {
        if self.dialect == Dialect::SQLite {
            if is_sqlite_memory(&self.config.database) {
                return Err(
                    UnsupportedOperationError::new("drop_database_if_exists", self.dialect).into(),
                );
            }
            return match tokio::fs::remove_file(&self.config.database).await {
                Ok(()) => {
                    info!(path = %self.config.database, "Removed SQLite database file");
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        let sql = self
            .generator
            .generate_drop_database_if_exists(&self.config.database)
            .ok_or_else(|| {
                UnsupportedOperationError::new("drop_database_if_exists", self.dialect)
            })?;
        info!(dialect = %self.dialect, database = %self.config.database, "Dropping database");
        self.execute_on_server("drop_database_if_exists", &sql, cancel)
            .await
    }

    async fn apply_metadata_pre(
        &self,
        database: &DatabaseDescriptor,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError> {
        let statements = self.metadata_statements(database, MetadataPhase::Pre)?;
        info!(dialect = %self.dialect, statements = statements.len(), "Applying tables");
        self.apply_statements(statements, cancel).await
    }

    async fn apply_metadata_post(
        &self,
        database: &DatabaseDescriptor,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError> {
        let statements = self.metadata_statements(database, MetadataPhase::Post)?;
        info!(dialect = %self.dialect, statements = statements.len(), "Applying indexes and constraints");
        self.apply_statements(statements, cancel).await
    }

    async fn count_rows(
        &self,
        table: &TableDescriptor,
        cancel: &CancellationToken,
    ) -> Result<u64, MigrationError> {
        let pool = self.pool()?;
        let sql = self.generator.generate_count(table);
        let count = cancellable("count_rows", cancel, async {
            sqlx::query_scalar::<_, i64>(&sql)
                .fetch_one(pool)
                .await
                .map_err(|e| DatabaseError::query(format!("行数の取得に失敗しました: {}", e), sql.as_str()))
        })
        .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn read_page(
        &self,
        table: &TableDescriptor,
        page: PageInfo,
        cancel: &CancellationToken,
    ) -> Result<RowBatch, MigrationError> {
        let pool = self.pool()?;
        let sql = self.generator.generate_select_page(table, page);
        debug!(
            table = %table.display_name(),
            offset = page.offset,
            limit = page.limit,
            "Reading page"
        );

        let rows = cancellable("read_page", cancel, async {
            sqlx::query(&sql)
                .fetch_all(pool)
                .await
                .map_err(|e| DatabaseError::query(format!("ページの読み出しに失敗しました: {}", e), sql.as_str()))
        })
        .await?;

        let decoded = rows
            .iter()
            .map(|row| self.decode_row(row, &table.columns))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RowBatch::new(table.column_names(), decoded))
    }

    async fn write_page(
        &self,
        table: &TableDescriptor,
        batch: &RowBatch,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError> {
        if batch.is_empty() {
            return Ok(());
        }

        let pool = self.pool()?;
        let literals = self.render_literals(table, batch);
        let sql = self.generator.generate_insert(table, batch.columns(), &literals);
        debug!(table = %table.display_name(), rows = batch.len(), "Writing page");

        cancellable("write_page", cancel, async {
            // ページ単位でトランザクションを張る
            let mut tx = pool.begin().await.map_err(|e| DatabaseError::Transaction {
                message: format!("トランザクションの開始に失敗しました: {}", e),
            })?;

            sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(sql.as_str()))
                .await
                .map_err(|e| DatabaseError::query(format!("ページの書き込みに失敗しました: {}", e), sql.as_str()))?;

            tx.commit().await.map_err(|e| DatabaseError::Transaction {
                message: format!("トランザクションのコミットに失敗しました: {}", e),
            })
        })
        .await?;

        Ok(())
    }

    fn metadata_statements(
        &self,
        database: &DatabaseDescriptor,
        phase: MetadataPhase,
    ) -> Result<Vec<String>, MigrationError> {
        let mut statements = Vec::new();

        match phase {
            MetadataPhase::Pre => {
                for schema in &database.schemas {
                    if let Some(sql) = self.generator.generate_create_schema(schema) {
                        statements.push(sql);
                    }
                }
                for table in &database.tables {
                    let columns = self.column_definitions(table)?;
                    statements.push(self.generator.generate_create_table(table, &columns));
                }
            }
            MetadataPhase::Post => {
                for table in &database.tables {
                    for index in &table.indexes {
                        statements.push(self.generator.generate_create_index(table, index));
                    }
                    for foreign_key in &table.foreign_keys {
                        match self.generator.generate_add_foreign_key(table, foreign_key) {
                            Some(sql) => statements.push(sql),
                            None => warn!(
                                dialect = %self.dialect,
                                table = %table.display_name(),
                                foreign_key = %foreign_key.name,
                                "Foreign keys cannot be added after table creation, skipping"
                            ),
                        }
                    }
                    for column in table.identity_columns() {
                        if let Some(sql) = self.generator.generate_identity_reset(table, column) {
                            statements.push(sql);
                        }
                    }
                }
            }
        }

        Ok(statements)
    }

    fn dump_table(
        &self,
        table: &TableDescriptor,
        batch: &RowBatch,
        sink: &mut (dyn Write + Send),
    ) -> Result<(), MigrationError> {
        for literals in self.render_literals(table, batch) {
            let statement = self
                .generator
                .generate_dump_insert(table, batch.columns(), &literals);
            writeln!(sink, "{}", statement)?;
            writeln!(sink)?;
        }
        Ok(())
    }
}
