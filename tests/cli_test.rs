/// CLI エントリーポイントのテスト
///
/// このテストは、CLIの構造が正しく定義され、すべてのサブコマンドとオプションが
/// 期待通りにパースされることを確認します。
use clap::Parser;

#[cfg(test)]
mod cli_tests {
    use super::*;
    use dataferry::cli::{Cli, Commands, OutputFormat, TerminatorArg};
    use std::path::PathBuf;

    /// CLIメイン構造体がパース可能であることを確認
    #[test]
    fn test_cli_can_parse() {
        // ヘルプは成功ではなくエラーを返すが、それは正常な動作
        assert!(Cli::try_parse_from(["dataferry", "--help"]).is_err());
        assert!(Cli::try_parse_from(["dataferry", "--version"]).is_err());
    }

    /// サブコマンドなしはエラーになることを確認
    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["dataferry"]).is_err());
    }

    /// migrateサブコマンドの既定値を確認
    #[test]
    fn test_migrate_defaults() {
        let cli = Cli::try_parse_from(["dataferry", "migrate"]).unwrap();
        match cli.command {
            Commands::Migrate {
                no_meta,
                no_data,
                page_size,
                create_target,
                drop_target,
            } => {
                assert!(!no_meta);
                assert!(!no_data);
                assert_eq!(page_size, None);
                assert!(!create_target);
                assert!(!drop_target);
            }
            _ => panic!("Expected Migrate command"),
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    /// migrateサブコマンドのオプションを確認
    #[test]
    fn test_migrate_with_options() {
        let cli = Cli::try_parse_from([
            "dataferry",
            "migrate",
            "--no-meta",
            "--page-size",
            "200",
            "--drop-target",
            "--create-target",
        ])
        .unwrap();

        match cli.command {
            Commands::Migrate {
                no_meta,
                page_size,
                create_target,
                drop_target,
                ..
            } => {
                assert!(no_meta);
                assert_eq!(page_size, Some(200));
                assert!(create_target);
                assert!(drop_target);
            }
            _ => panic!("Expected Migrate command"),
        }
    }

    /// ページサイズに数値以外を指定するとエラーになることを確認
    #[test]
    fn test_migrate_rejects_non_numeric_page_size() {
        assert!(Cli::try_parse_from(["dataferry", "migrate", "--page-size", "many"]).is_err());
    }

    /// dumpサブコマンドのパースを確認
    #[test]
    fn test_dump_command() {
        let cli = Cli::try_parse_from([
            "dataferry",
            "dump",
            "-o",
            "out.sql",
            "--dialect",
            "mysql",
            "--no-meta",
        ])
        .unwrap();

        match cli.command {
            Commands::Dump {
                output,
                dialect,
                no_meta,
                page_size,
            } => {
                assert_eq!(output, PathBuf::from("out.sql"));
                assert_eq!(dialect.as_deref(), Some("mysql"));
                assert!(no_meta);
                assert_eq!(page_size, None);
            }
            _ => panic!("Expected Dump command"),
        }
    }

    /// dumpサブコマンドは出力ファイルが必須であることを確認
    #[test]
    fn test_dump_requires_output() {
        assert!(Cli::try_parse_from(["dataferry", "dump"]).is_err());
    }

    /// importサブコマンドの終端指定を確認
    #[test]
    fn test_import_terminator() {
        let cli = Cli::try_parse_from(["dataferry", "import", "-i", "dump.sql"]).unwrap();
        match cli.command {
            Commands::Import { input, terminator } => {
                assert_eq!(input, PathBuf::from("dump.sql"));
                assert_eq!(terminator, TerminatorArg::Semicolon);
            }
            _ => panic!("Expected Import command"),
        }

        let cli = Cli::try_parse_from([
            "dataferry",
            "import",
            "--input",
            "batches.sql",
            "--terminator",
            "go",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Import {
                terminator: TerminatorArg::Go,
                ..
            }
        ));
    }

    /// グローバルオプションがサブコマンドの後でも指定できることを確認
    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "dataferry",
            "inspect",
            "--config",
            "custom.yaml",
            "--verbose",
            "--no-color",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Inspect));
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    /// 未知のサブコマンドはエラーになることを確認
    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["dataferry", "rollback"]).is_err());
    }
}
