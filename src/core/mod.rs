// Core Domain
// スキーマ・型・値のモデルと、エンジンに依存しない純粋なロジック

pub mod config;
pub mod error;
pub mod naming;
pub mod schema;
pub mod type_translator;
pub mod value;
