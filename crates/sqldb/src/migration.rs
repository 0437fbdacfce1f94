//! Content-addressed migration runner.
//!
//! Applied migrations are tracked in the `migrations` table keyed by the MD5
//! of their content, not by name. Renaming an applied file is harmless;
//! editing one makes it a new migration.

use crate::checksum::ContentHash;
use crate::error::{DbError, MigrationError, MigrationResult};
use crate::executor::{transaction, StatementExecutor};
use crate::source::{MigrationScript, MigrationSet, MigrationSource};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashSet;

/// Bookkeeping table DDL. Safe to run on every start.
pub const MIGRATIONS_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS migrations (
    file TEXT NOT NULL,
    md5 TEXT NOT NULL,
    applied_at TIMESTAMP NOT NULL,
    PRIMARY KEY (md5)
);";

const FIND_BY_CHECKSUM: &str = "SELECT file FROM migrations WHERE md5 = ?";
const INSERT_RECORD: &str = "INSERT INTO migrations (file, md5, applied_at) VALUES (?, ?, ?)";
const LIST_RECORDS: &str = "SELECT file, md5, CAST(applied_at AS VARCHAR) FROM migrations \
                            ORDER BY applied_at, file";

/// `applied_at` is written in UTC without an offset so both SQLite (text)
/// and DuckDB (TIMESTAMP) store the same value.
const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Offset-carrying forms found in older tables: `+02:00` as written by Go's
/// sqlite driver, `+00` as DuckDB renders a TIMESTAMPTZ.
const TIMESTAMP_TZ_READ_FORMATS: [&str; 2] =
    ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// One row of the bookkeeping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    /// Name the migration had when it was applied (`file` column)
    pub name: String,
    /// Content fingerprint (`md5` column, primary key)
    pub checksum: ContentHash,
    pub applied_at: DateTime<Utc>,
}

/// Runner behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Execute and record each migration inside one transaction.
    ///
    /// When off, a migration whose record insert fails stays applied but
    /// unrecorded and is executed again on the next run.
    pub atomic: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self { atomic: true }
    }
}

/// Outcome of a successful run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

/// Applies migrations from a [`MigrationSource`] to a borrowed executor.
pub struct MigrationRunner<'a, E: StatementExecutor + ?Sized> {
    db: &'a E,
    options: RunnerOptions,
}

impl<'a, E: StatementExecutor + ?Sized> MigrationRunner<'a, E> {
    pub fn new(db: &'a E) -> Self {
        Self::with_options(db, RunnerOptions::default())
    }

    pub fn with_options(db: &'a E, options: RunnerOptions) -> Self {
        Self { db, options }
    }

    pub fn options(&self) -> RunnerOptions {
        self.options
    }

    /// Create the bookkeeping table if it does not exist yet.
    pub fn ensure_bookkeeping_table(&self) -> MigrationResult<()> {
        self.db
            .execute_batch(MIGRATIONS_TABLE_DDL)
            .map_err(|e| MigrationError::bookkeeping("creating the migrations table", e))
    }

    /// Apply every migration of `source` that has not been applied yet.
    ///
    /// Migrations run in ascending name order. The first failure aborts the
    /// run; migrations applied before it stay applied.
    pub fn run(&self, source: &(impl MigrationSource + ?Sized)) -> MigrationResult<RunSummary> {
        self.ensure_bookkeeping_table()?;
        let set = MigrationSet::load(source)?;
        log::info!(
            "Running {} migration(s) from {} on {}",
            set.len(),
            source.describe(),
            self.db.db_type()
        );

        let mut summary = RunSummary::default();
        for script in &set {
            let checksum = ContentHash::of(&script.content);
            if let Some(recorded_as) = self.find_applied(&checksum)? {
                log::debug!(
                    "Migration already applied: {} (md5 {checksum}, recorded as {recorded_as})",
                    script.name
                );
                summary.skipped.push(script.name.clone());
                continue;
            }

            log::info!("Migration applying: {}", script.name);
            if self.options.atomic {
                transaction(self.db, |db| apply_and_record(db, script, &checksum))?;
            } else {
                apply_and_record(self.db, script, &checksum)?;
            }
            log::info!("Migration applied: {}", script.name);
            summary.applied.push(script.name.clone());
        }
        Ok(summary)
    }

    /// Migrations of `source` that a run would apply, in execution order.
    ///
    /// Creates the bookkeeping table if needed but executes nothing else.
    pub fn pending(
        &self,
        source: &(impl MigrationSource + ?Sized),
    ) -> MigrationResult<Vec<MigrationScript>> {
        self.ensure_bookkeeping_table()?;
        let set = MigrationSet::load(source)?;

        let mut planned = HashSet::new();
        let mut pending = Vec::new();
        for script in &set {
            let checksum = ContentHash::of(&script.content);
            if planned.contains(&checksum) || self.find_applied(&checksum)?.is_some() {
                continue;
            }
            planned.insert(checksum);
            pending.push(script.clone());
        }
        Ok(pending)
    }

    /// All recorded migrations, oldest first.
    pub fn applied(&self) -> MigrationResult<Vec<MigrationRecord>> {
        self.ensure_bookkeeping_table()?;
        let rows = self
            .db
            .query_rows(LIST_RECORDS, &[])
            .map_err(|e| MigrationError::bookkeeping("listing applied migrations", e))?;

        rows.into_iter().map(record_from_row).collect()
    }

    fn find_applied(&self, checksum: &ContentHash) -> MigrationResult<Option<String>> {
        self.db
            .query_optional(FIND_BY_CHECKSUM, &[checksum.as_str()])
            .map_err(|e| MigrationError::bookkeeping(format!("looking up md5 {checksum}"), e))
    }
}

/// Execute `script` as one batch, then record it.
fn apply_and_record<E: StatementExecutor + ?Sized>(
    db: &E,
    script: &MigrationScript,
    checksum: &ContentHash,
) -> MigrationResult<()> {
    let sql = std::str::from_utf8(&script.content).map_err(|_| {
        MigrationError::InvalidEncoding {
            name: script.name.clone(),
        }
    })?;

    db.execute_batch(sql).map_err(|e| {
        log::error!("Error applying migration {}: {e}", script.name);
        MigrationError::Execution {
            name: script.name.clone(),
            source: e,
        }
    })?;

    let applied_at = Utc::now().format(TIMESTAMP_WRITE_FORMAT).to_string();
    db.execute(
        INSERT_RECORD,
        &[script.name.as_str(), checksum.as_str(), applied_at.as_str()],
    )
    .map_err(|e| MigrationError::bookkeeping(format!("recording {}", script.name), e))?;
    Ok(())
}

fn record_from_row(row: Vec<String>) -> MigrationResult<MigrationRecord> {
    let malformed = |message: String| {
        MigrationError::bookkeeping("reading applied migrations", DbError::QueryError(message))
    };
    let [name, md5, applied_at]: [String; 3] = row
        .try_into()
        .map_err(|row: Vec<String>| malformed(format!("expected 3 columns, got {}", row.len())))?;
    let applied_at = parse_applied_at(&applied_at)
        .map_err(|e| malformed(format!("invalid applied_at '{applied_at}': {e}")))?;
    Ok(MigrationRecord {
        name,
        checksum: ContentHash::from_stored(md5),
        applied_at,
    })
}

fn parse_applied_at(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    for format in TIMESTAMP_TZ_READ_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Ok(ts.with_timezone(&Utc));
        }
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_READ_FORMAT).map(|ts| ts.and_utc())
}

/// Run all unapplied migrations from `source` with default options.
pub fn run_migrations<E: StatementExecutor + ?Sized>(
    db: &E,
    source: &(impl MigrationSource + ?Sized),
) -> MigrationResult<RunSummary> {
    MigrationRunner::new(db).run(source)
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
