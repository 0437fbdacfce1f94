//! SQLite storage handle.
//!
//! [`SqliteDb`] owns a rusqlite [`Connection`] and is the handle callers pass
//! to the migration runner. There is no process-wide connection.

use crate::error::{DbError, DbResult, MigrationResult};
use crate::executor::StatementExecutor;
use crate::migration::{run_migrations, RunSummary};
use crate::source::{DirectorySource, EmbeddedSource};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use rust_embed::RustEmbed;
use std::path::Path;

/// Wrapper around a SQLite connection.
///
/// Single-threaded: migrations run once, to completion, at startup.
pub struct SqliteDb {
    conn: Connection,
}

impl SqliteDb {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open from a path string (handles the `:memory:` special case).
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::open_in_memory()
        } else {
            Self::open(Path::new(path))
        }
    }

    /// Borrow the underlying rusqlite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Apply the `*.sql` files found directly inside `dir`.
    pub fn run_migrations(&self, dir: impl AsRef<Path>) -> MigrationResult<RunSummary> {
        log::info!("Running migrations from {}", dir.as_ref().display());
        run_migrations(self, &DirectorySource::new(dir.as_ref()))
    }

    /// Apply the `*.sql` files of an embedded bundle.
    pub fn run_migrations_from_embed<E: RustEmbed>(&self) -> MigrationResult<RunSummary> {
        log::info!("Running migrations from embedded files");
        run_migrations(self, &EmbeddedSource::<E>::new())
    }
}

fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "null".to_string(),
        ValueRef::Integer(n) => n.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

impl StatementExecutor for SqliteDb {
    fn db_type(&self) -> &'static str {
        "sqlite"
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        self.conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn query_optional(&self, sql: &str, params: &[&str]) -> DbResult<Option<String>> {
        self.conn
            .query_row(sql, params_from_iter(params.iter()), |row| {
                row.get_ref(0).map(value_to_string)
            })
            .optional()
            .map_err(|e| DbError::QueryError(format!("{e}: {sql}")))
    }

    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DbError::QueryError(format!("prepare failed: {e}")))?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let col_count = row.as_ref().column_count();
                (0..col_count)
                    .map(|i| row.get_ref(i).map(value_to_string))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|e| DbError::QueryError(format!("query failed: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::QueryError(format!("row error: {e}")))?;
        Ok(rows)
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
