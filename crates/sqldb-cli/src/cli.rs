//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use sqldb::DbType;

/// sqldb - apply SQL migrations exactly once, tracked by content hash
#[derive(Parser, Debug)]
#[command(name = "sqldb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path (or :memory:), relative to the project directory
    #[arg(short, long, global = true, env = "SQLDB_DATABASE")]
    pub database: Option<String>,

    /// Override database backend
    #[arg(short, long, global = true, value_enum)]
    pub backend: Option<Backend>,
}

/// Database backends selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// SQLite
    Sqlite,
    /// DuckDB
    Duckdb,
}

impl From<Backend> for DbType {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Sqlite => DbType::Sqlite,
            Backend::Duckdb => DbType::DuckDb,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Migrate(MigrateArgs),

    /// Show applied and pending migrations
    Status(StatusArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Override migrations directory
    #[arg(long)]
    pub dir: Option<String>,

    /// List what would be applied without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Execute and record each migration without a wrapping transaction
    #[arg(long)]
    pub non_atomic: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Override migrations directory
    #[arg(long)]
    pub dir: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
