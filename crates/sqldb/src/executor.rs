//! Statement executor abstraction.
//!
//! The runner only needs raw batches, single-row lookups and parameterised
//! inserts, so the trait stays that small. Parameters are bound as text.

use crate::config::{DatabaseConfig, DbType};
use crate::error::{DbError, DbResult};

/// A database the migration runner can drive.
///
/// Implementations own their connection; the runner only borrows them.
pub trait StatementExecutor {
    /// Backend identifier for logging
    fn db_type(&self) -> &'static str;

    /// Execute one or more `;`-separated statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a single statement with bound text parameters, returns affected rows
    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Run a query and return the first column of the first row, or `None`
    /// when no row matches
    fn query_optional(&self, sql: &str, params: &[&str]) -> DbResult<Option<String>>;

    /// Run a query and return every row with each column coerced to text
    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>>;
}

impl<E: StatementExecutor + ?Sized> StatementExecutor for Box<E> {
    fn db_type(&self) -> &'static str {
        (**self).db_type()
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        (**self).execute_batch(sql)
    }

    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        (**self).execute(sql, params)
    }

    fn query_optional(&self, sql: &str, params: &[&str]) -> DbResult<Option<String>> {
        (**self).query_optional(sql, params)
    }

    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>> {
        (**self).query_rows(sql, params)
    }
}

/// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
/// error.
pub fn transaction<E, T, Err, F>(db: &E, body: F) -> Result<T, Err>
where
    E: StatementExecutor + ?Sized,
    Err: From<DbError>,
    F: FnOnce(&E) -> Result<T, Err>,
{
    db.execute_batch("BEGIN TRANSACTION")
        .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

    let result = body(db);

    match &result {
        Ok(_) => {
            if let Err(commit_err) = db.execute_batch("COMMIT") {
                if let Err(rollback_err) = db.execute_batch("ROLLBACK") {
                    log::warn!("ROLLBACK failed on {}: {rollback_err}", db.db_type());
                }
                return Err(
                    DbError::TransactionError(format!("COMMIT failed: {commit_err}")).into(),
                );
            }
        }
        Err(_) => {
            if let Err(rollback_err) = db.execute_batch("ROLLBACK") {
                log::warn!("ROLLBACK failed on {}: {rollback_err}", db.db_type());
            }
        }
    }
    result
}

/// Open the backend described by `config`.
pub fn connect(config: &DatabaseConfig) -> DbResult<Box<dyn StatementExecutor>> {
    match config.db_type {
        DbType::Sqlite => Ok(Box::new(crate::sqlite::SqliteDb::new(&config.path)?)),
        #[cfg(feature = "duckdb")]
        DbType::DuckDb => Ok(Box::new(crate::duckdb::DuckDbBackend::new(&config.path)?)),
        #[cfg(not(feature = "duckdb"))]
        DbType::DuckDb => Err(DbError::ConnectionError(
            "DuckDB support was not compiled in (enable the `duckdb` feature)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteDb;

    fn count(db: &SqliteDb, table: &str) -> String {
        db.query_optional(&format!("SELECT COUNT(*) FROM {table}"), &[])
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_transaction_commits() {
        let db = SqliteDb::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INT)").unwrap();

        let rows: DbResult<usize> =
            transaction(&db, |db| db.execute("INSERT INTO t VALUES (1)", &[]));
        assert_eq!(rows.unwrap(), 1);
        assert_eq!(count(&db, "t"), "1");
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = SqliteDb::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INT)").unwrap();

        let result: DbResult<()> = transaction(&db, |db| {
            db.execute("INSERT INTO t VALUES (1)", &[])?;
            db.execute_batch("INSERT INTO missing VALUES (1)")
        });
        assert!(result.is_err());
        assert_eq!(count(&db, "t"), "0");
    }

    #[test]
    fn test_transaction_begin_failure_is_reported() {
        let db = SqliteDb::open_in_memory().unwrap();
        db.execute_batch("BEGIN TRANSACTION").unwrap();

        let result: DbResult<()> = transaction(&db, |_| Ok(()));
        assert!(matches!(result, Err(DbError::TransactionError(_))));
    }

    #[test]
    fn test_transaction_commit_failure_rolls_back() {
        let db = SqliteDb::open_in_memory().unwrap();
        db.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INT PRIMARY KEY);
             CREATE TABLE child (
                 parent_id INT REFERENCES parent (id) DEFERRABLE INITIALLY DEFERRED
             );",
        )
        .unwrap();

        // Deferred constraint only fires at COMMIT.
        let result: DbResult<usize> =
            transaction(&db, |db| db.execute("INSERT INTO child VALUES (1)", &[]));
        match result {
            Err(DbError::TransactionError(msg)) => assert!(msg.contains("COMMIT failed")),
            other => panic!("expected COMMIT failure, got {other:?}"),
        }
        assert_eq!(count(&db, "child"), "0");

        let again: DbResult<()> = transaction(&db, |_| Ok(()));
        assert!(again.is_ok());
    }

    #[test]
    fn test_connect_sqlite_memory() {
        let config = DatabaseConfig {
            db_type: DbType::Sqlite,
            path: ":memory:".to_string(),
        };
        let db = connect(&config).unwrap();
        assert_eq!(db.db_type(), "sqlite");
        db.execute_batch("CREATE TABLE t (id INT)").unwrap();
    }

    #[cfg(feature = "duckdb")]
    #[test]
    fn test_connect_duckdb_memory() {
        let config = DatabaseConfig {
            db_type: DbType::DuckDb,
            path: ":memory:".to_string(),
        };
        let db = connect(&config).unwrap();
        assert_eq!(db.db_type(), "duckdb");
    }
}
