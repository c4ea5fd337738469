// 命名ポリシー
//
// アプリケーション名と関連パスの単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "dataferry";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".dataferry.yaml";

/// バイナリ名
pub const BINARY_NAME: &str = "dataferry";

/// RUST_LOG未設定時のログフィルタ
pub const DEFAULT_LOG_FILTER: &str = "dataferry=info";

/// --verbose指定時のログフィルタ
pub const VERBOSE_LOG_FILTER: &str = "dataferry=debug";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_constants() {
        assert_eq!(APP_NAME, "dataferry");
        assert_eq!(CONFIG_FILE, ".dataferry.yaml");
        assert!(DEFAULT_LOG_FILTER.starts_with(BINARY_NAME));
        assert!(VERBOSE_LOG_FILTER.ends_with("debug"));
    }
}
