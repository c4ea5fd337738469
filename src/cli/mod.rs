// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// スクリプトの文の終端
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TerminatorArg {
    /// Statements end with a trailing semicolon
    #[default]
    Semicolon,
    /// Batches end with a line containing only `go`
    Go,
}

/// Dataferry - Cross-engine database migration CLI
///
/// Moves schema and row data between PostgreSQL, MySQL and SQLite.
#[derive(Parser, Debug)]
#[command(name = "dataferry")]
#[command(author = "Dataferry Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cross-engine database migration CLI tool")]
#[command(long_about = "Dataferry - Cross-engine database migration CLI

Moves schema and row data between heterogeneous database engines.

Dataferry helps you:
  • Copy tables, indexes and foreign keys to another engine
  • Transfer rows page by page with per-table reports
  • Dump a database as INSERT statements for another engine
  • Replay SQL scripts statement by statement

Supported databases: PostgreSQL, MySQL, SQLite")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Describe source and target:   Edit .dataferry.yaml
  2. Inspect the source:           dataferry inspect
  3. Run the migration:            dataferry migrate --create-target

For detailed help on each command, use: dataferry <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate schema and data from source to target
    ///
    /// Runs the pre-script, creates tables on the target, transfers rows
    /// page by page, then creates indexes and foreign keys and runs the post-script.
    ///
    /// EXAMPLES:
    ///   # Full migration into an existing target database
    ///   dataferry migrate
    ///
    ///   # Recreate the target database first
    ///   dataferry migrate --drop-target --create-target
    ///
    ///   # Data only, with smaller pages
    ///   dataferry migrate --no-meta --page-size 200
    Migrate {
        /// Skip tables, indexes and constraints
        #[arg(long)]
        no_meta: bool,

        /// Skip row data
        #[arg(long)]
        no_data: bool,

        /// Rows per page (overrides migration.max_page_size)
        #[arg(long, value_name = "ROWS")]
        page_size: Option<u64>,

        /// Create the target database before migrating
        #[arg(long)]
        create_target: bool,

        /// Drop the target database if it exists before migrating
        #[arg(long)]
        drop_target: bool,
    },

    /// Dump source rows as INSERT statements
    ///
    /// EXAMPLES:
    ///   # Dump tables and rows for the target engine
    ///   dataferry dump --output dump.sql
    ///
    ///   # Dump only rows, rendered for MySQL
    ///   dataferry dump --output dump.sql --dialect mysql --no-meta
    Dump {
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Dialect of the generated SQL (defaults to the target engine)
        #[arg(short, long, value_name = "DIALECT")]
        dialect: Option<String>,

        /// Skip CREATE TABLE, index and foreign key statements
        #[arg(long)]
        no_meta: bool,

        /// Rows per page (overrides migration.max_page_size)
        #[arg(long, value_name = "ROWS")]
        page_size: Option<u64>,
    },

    /// Replay a SQL script into the target database
    ///
    /// EXAMPLES:
    ///   # Replay a dump
    ///   dataferry import --input dump.sql
    ///
    ///   # Replay a script with go-separated batches
    ///   dataferry import --input batches.sql --terminator go
    Import {
        /// Script file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Statement terminator
        #[arg(long, value_enum, default_value = "semicolon")]
        terminator: TerminatorArg,
    },

    /// Print the source database structure
    Inspect,
}
