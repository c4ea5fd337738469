use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use dataferry::cli::commands::dump::{DumpCommand, DumpCommandHandler};
use dataferry::cli::commands::import::{ImportCommand, ImportCommandHandler};
use dataferry::cli::commands::inspect::{InspectCommand, InspectCommandHandler};
use dataferry::cli::commands::migrate::{MigrateCommand, MigrateCommandHandler};
use dataferry::cli::{Cli, Commands};
use dataferry::core::naming::{DEFAULT_LOG_FILTER, VERBOSE_LOG_FILTER};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    sqlx::any::install_default_drivers();

    // CLIをパースして実行
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// ログ出力を初期化（標準出力はコマンドの出力に使うため標準エラーへ）
///
/// RUST_LOG が設定されていればそれを優先します。
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    // --config フラグの処理（絶対パスに変換）
    let config_path: Option<PathBuf> = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            project_path.join(p)
        }
    });

    match cli.command {
        Commands::Migrate {
            no_meta,
            no_data,
            page_size,
            create_target,
            drop_target,
        } => {
            let handler = MigrateCommandHandler::new();
            let command = MigrateCommand {
                project_path,
                config_path,
                no_meta,
                no_data,
                page_size,
                create_target,
                drop_target,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Dump {
            output,
            dialect,
            no_meta,
            page_size,
        } => {
            let handler = DumpCommandHandler::new();
            let command = DumpCommand {
                project_path,
                config_path,
                output,
                dialect,
                no_meta,
                page_size,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Import { input, terminator } => {
            let handler = ImportCommandHandler::new();
            let command = ImportCommand {
                project_path,
                config_path,
                input,
                terminator,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Inspect => {
            let handler = InspectCommandHandler::new();
            let command = InspectCommand {
                project_path,
                config_path,
            };
            handler.execute(&command).await
        }
    }
}
