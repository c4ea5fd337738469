// Services Layer
// アダプターを組み合わせて移行・ダンプ・スクリプト実行を行うサービス層

pub mod config_loader;
pub mod dumper;
pub mod migration_orchestrator;
pub mod script_interpreter;
