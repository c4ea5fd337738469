// Adapters
// データベースエンジンごとの差異（接続・型・値・式・SQL）を吸収する層

pub mod connection;
pub mod connection_string;
pub mod database_introspector;
pub mod engine_adapter;
pub mod expression_translator;
pub mod sql_generator;
pub mod sql_quote;
pub mod type_mapping;
pub mod value_representer;
