// Dataferryライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメイン（スキーマ・型・値のモデル、設定、エラー）
// - adapters: データベースエンジンごとの差異を吸収するアダプター
// - services: 移行・ダンプ・スクリプト実行のサービス

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
