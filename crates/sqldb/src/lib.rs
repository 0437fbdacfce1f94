//! sqldb - content-addressed SQL migration runner
//!
//! Applies `.sql` migrations to SQLite (or DuckDB) exactly once each, in name
//! order, tracking what was applied by the MD5 of each file's content in a
//! `migrations` table.
//!
//! ```no_run
//! use sqldb::{run_migrations, DirectorySource, SqliteDb};
//!
//! let db = SqliteDb::open(std::path::Path::new("app.db"))?;
//! let summary = run_migrations(&db, &DirectorySource::new("migrations"))?;
//! println!("applied {} migration(s)", summary.applied.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod checksum;
pub mod config;
#[cfg(feature = "duckdb")]
pub mod duckdb;
pub mod error;
pub mod executor;
pub mod migration;
pub mod source;
pub mod sqlite;

pub use checksum::ContentHash;
pub use config::{Config, DatabaseConfig, DbType, MigrationsConfig};
#[cfg(feature = "duckdb")]
pub use duckdb::DuckDbBackend;
pub use error::{ConfigError, DbError, MigrationError, MigrationResult};
pub use executor::{connect, StatementExecutor};
pub use migration::{
    run_migrations, MigrationRecord, MigrationRunner, RunSummary, RunnerOptions,
};
pub use source::{DirectorySource, EmbeddedSource, MigrationScript, MigrationSet, MigrationSource};
pub use sqlite::SqliteDb;
