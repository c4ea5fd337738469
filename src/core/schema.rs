// スキーマドメインモデル
//
// エンジンに依存しないデータベース構造の記述子。
// DatabaseDescriptor, TableDescriptor, ColumnDescriptor, DataTypeDescriptor などを提供します。

use crate::core::error::TypeParseError;
use crate::core::value::SqlValue;
use serde::{Deserialize, Serialize};

/// データベース記述子
///
/// 1回の移行単位のルート。ソースエンジンから構築された後は変更されません。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    /// スキーマ（名前空間）のリスト
    pub schemas: Vec<SchemaDescriptor>,

    /// テーブルのリスト（移行順）
    pub tables: Vec<TableDescriptor>,
}

impl DatabaseDescriptor {
    /// 新しいデータベース記述子を作成
    pub fn new(schemas: Vec<SchemaDescriptor>, tables: Vec<TableDescriptor>) -> Self {
        Self { schemas, tables }
    }

    /// 指定されたテーブルを取得
    pub fn get_table(&self, schema: Option<&str>, name: &str) -> Option<&TableDescriptor> {
        self.tables
            .iter()
            .find(|t| t.name == name && t.schema.as_deref() == schema)
    }

    /// テーブル数を取得
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// スキーマ記述子（名前のみ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// スキーマ名
    pub name: String,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// テーブル記述子
///
/// カラムの順序は生成されるカラムリストと行バッファの位置を決めるため保持されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// テーブル名
    pub name: String,

    /// スキーマ名（スキーマを持たないエンジンではNone）
    #[serde(default)]
    pub schema: Option<String>,

    /// 説明
    #[serde(default)]
    pub description: Option<String>,

    /// カラム定義のリスト（順序あり）
    pub columns: Vec<ColumnDescriptor>,

    /// プライマリキーのカラム名
    #[serde(default)]
    pub primary_key: Vec<String>,

    /// セカンダリインデックス（データ投入後に作成）
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,

    /// 外部キー（データ投入後に作成）
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

impl TableDescriptor {
    /// 新しいテーブルを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            description: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// スキーマ名を設定
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// カラムを追加
    pub fn add_column(&mut self, column: ColumnDescriptor) {
        self.columns.push(column);
    }

    /// 指定されたカラムを取得
    pub fn get_column(&self, column_name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == column_name)
    }

    /// カラム名を定義順で取得
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// ログ・エラー表示用の修飾名（schema.table）
    pub fn display_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    /// 自動増分カラム
    pub fn identity_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.identity)
    }
}

/// カラム記述子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// カラム名
    pub name: String,

    /// 共通型
    #[serde(rename = "type")]
    pub data_type: DataTypeDescriptor,

    /// NULL許可フラグ
    pub nullable: bool,

    /// デフォルト値式
    #[serde(default)]
    pub default_value: Option<SqlExpressionDescriptor>,

    /// 自動増分（IDENTITY）フラグ
    #[serde(default)]
    pub identity: bool,
}

impl ColumnDescriptor {
    /// 新しいカラムを作成
    pub fn new(name: impl Into<String>, data_type: DataTypeDescriptor, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
            default_value: None,
            identity: false,
        }
    }

    /// デフォルト値式を設定
    pub fn with_default(mut self, default_value: SqlExpressionDescriptor) -> Self {
        self.default_value = Some(default_value);
        self
    }

    /// 自動増分カラムとして設定
    pub fn with_identity(mut self) -> Self {
        self.identity = true;
        self
    }
}

/// インデックス記述子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// インデックス名
    pub name: String,
    /// 対象カラム（順序あり）
    pub columns: Vec<String>,
    /// ユニークインデックスかどうか
    pub unique: bool,
}

/// 外部キー記述子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    /// 制約名
    pub name: String,
    /// 参照元カラム
    pub columns: Vec<String>,
    /// 参照先スキーマ
    #[serde(default)]
    pub referenced_schema: Option<String>,
    /// 参照先テーブル
    pub referenced_table: String,
    /// 参照先カラム
    pub referenced_columns: Vec<String>,
}

/// 共通型タグ
///
/// 各タグは固定の引数の数（アリティ）を持ちます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataTypeTag {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Char,
    Varchar,
    Text,
    Binary,
    Varbinary,
    Blob,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Guid,
    Json,
}

impl DataTypeTag {
    /// 全タグ（パース時の探索順）
    pub const ALL: [DataTypeTag; 19] = [
        DataTypeTag::Boolean,
        DataTypeTag::SmallInt,
        DataTypeTag::Integer,
        DataTypeTag::BigInt,
        DataTypeTag::Real,
        DataTypeTag::Double,
        DataTypeTag::Decimal,
        DataTypeTag::Char,
        DataTypeTag::Varchar,
        DataTypeTag::Text,
        DataTypeTag::Binary,
        DataTypeTag::Varbinary,
        DataTypeTag::Blob,
        DataTypeTag::Date,
        DataTypeTag::Time,
        DataTypeTag::DateTime,
        DataTypeTag::DateTimeOffset,
        DataTypeTag::Guid,
        DataTypeTag::Json,
    ];

    /// 共通型テキストでの名前
    pub fn name(&self) -> &'static str {
        match self {
            DataTypeTag::Boolean => "boolean",
            DataTypeTag::SmallInt => "smallint",
            DataTypeTag::Integer => "integer",
            DataTypeTag::BigInt => "bigint",
            DataTypeTag::Real => "real",
            DataTypeTag::Double => "double",
            DataTypeTag::Decimal => "decimal",
            DataTypeTag::Char => "char",
            DataTypeTag::Varchar => "varchar",
            DataTypeTag::Text => "text",
            DataTypeTag::Binary => "binary",
            DataTypeTag::Varbinary => "varbinary",
            DataTypeTag::Blob => "blob",
            DataTypeTag::Date => "date",
            DataTypeTag::Time => "time",
            DataTypeTag::DateTime => "datetime",
            DataTypeTag::DateTimeOffset => "datetimeoffset",
            DataTypeTag::Guid => "guid",
            DataTypeTag::Json => "json",
        }
    }

    /// 名前からタグを取得（大文字小文字を区別しない）
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.name().eq_ignore_ascii_case(name))
    }

    /// 要求される引数の数
    pub fn arity(&self) -> usize {
        match self {
            DataTypeTag::Char
            | DataTypeTag::Varchar
            | DataTypeTag::Binary
            | DataTypeTag::Varbinary => 1,
            DataTypeTag::Decimal => 2,
            _ => 0,
        }
    }

    /// 整数系の型かどうか
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataTypeTag::SmallInt | DataTypeTag::Integer | DataTypeTag::BigInt
        )
    }

    /// 文字列系の型かどうか
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            DataTypeTag::Char | DataTypeTag::Varchar | DataTypeTag::Text | DataTypeTag::Json
        )
    }

    /// バイナリ系の型かどうか
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            DataTypeTag::Binary | DataTypeTag::Varbinary | DataTypeTag::Blob
        )
    }
}

impl std::fmt::Display for DataTypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// データ型記述子
///
/// 共通型タグと最大2つの整数引数（長さ/精度、スケール）。
/// 引数の数は常にタグのアリティと一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataTypeDescriptor {
    tag: DataTypeTag,
    arg1: Option<u32>,
    arg2: Option<u32>,
}

impl DataTypeDescriptor {
    /// アリティを検証してデータ型を作成
    pub fn new(tag: DataTypeTag, args: &[u32]) -> Result<Self, TypeParseError> {
        if args.len() != tag.arity() {
            return Err(TypeParseError::ArgumentMismatch {
                tag: tag.name().to_string(),
                expected: tag.arity(),
                actual: args.len(),
                text: format_with_args(tag, args),
            });
        }
        Ok(Self {
            tag,
            arg1: args.first().copied(),
            arg2: args.get(1).copied(),
        })
    }

    /// 引数なしの型を作成（アリティ0以外のタグはエラー）
    pub fn scalar(tag: DataTypeTag) -> Result<Self, TypeParseError> {
        Self::new(tag, &[])
    }

    pub fn integer() -> Self {
        Self::plain(DataTypeTag::Integer)
    }

    pub fn bigint() -> Self {
        Self::plain(DataTypeTag::BigInt)
    }

    pub fn text() -> Self {
        Self::plain(DataTypeTag::Text)
    }

    pub fn boolean() -> Self {
        Self::plain(DataTypeTag::Boolean)
    }

    pub fn varchar(length: u32) -> Self {
        Self {
            tag: DataTypeTag::Varchar,
            arg1: Some(length),
            arg2: None,
        }
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self {
            tag: DataTypeTag::Decimal,
            arg1: Some(precision),
            arg2: Some(scale),
        }
    }

    // アリティ0のタグ専用
    fn plain(tag: DataTypeTag) -> Self {
        debug_assert_eq!(tag.arity(), 0);
        Self {
            tag,
            arg1: None,
            arg2: None,
        }
    }

    /// 型タグ
    pub fn tag(&self) -> DataTypeTag {
        self.tag
    }

    /// 第1引数（長さ/精度）
    pub fn arg1(&self) -> Option<u32> {
        self.arg1
    }

    /// 第2引数（スケール）
    pub fn arg2(&self) -> Option<u32> {
        self.arg2
    }

    fn args(&self) -> Vec<u32> {
        self.arg1.into_iter().chain(self.arg2).collect()
    }
}

fn format_with_args(tag: DataTypeTag, args: &[u32]) -> String {
    if args.is_empty() {
        tag.name().to_string()
    } else {
        let joined = args
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", tag.name(), joined)
    }
}

impl std::fmt::Display for DataTypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_with_args(self.tag, &self.args()))
    }
}

impl std::str::FromStr for DataTypeDescriptor {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::core::type_translator::TypeTranslator::parse(s)
    }
}

impl TryFrom<String> for DataTypeDescriptor {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataTypeDescriptor> for String {
    fn from(value: DataTypeDescriptor) -> Self {
        value.to_string()
    }
}

/// シンボリック関数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlFunction {
    /// 現在時刻（ローカル）
    Now,
    /// 現在時刻（UTC）
    UtcNow,
    /// 現在日付
    Today,
    /// UUID生成
    Uuid,
}

impl SqlFunction {
    pub fn name(&self) -> &'static str {
        match self {
            SqlFunction::Now => "now",
            SqlFunction::UtcNow => "utc_now",
            SqlFunction::Today => "today",
            SqlFunction::Uuid => "uuid",
        }
    }
}

impl std::fmt::Display for SqlFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// SQL式記述子
///
/// シンボリック関数・リテラル定数・未変換テキストのいずれか1つを保持します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SqlExpressionDescriptor {
    /// シンボリック関数
    Function(SqlFunction),
    /// 型付きリテラル定数
    Literal(SqlValue),
    /// 未変換のSQLテキスト
    Raw(String),
}
