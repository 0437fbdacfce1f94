//! Error types for sqldb.

use thiserror::Error;

/// Statement executor errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open or create the database (D001).
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement or batch execution error (D002).
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Query or row decoding error (D003).
    #[error("[D003] SQL query failed: {0}")]
    QueryError(String),

    /// Transaction management error (D004).
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),
}

/// Result type alias for [`DbError`].
pub type DbResult<T> = Result<T, DbError>;

/// Migration run errors.
///
/// `SourceNotFound`, `SourceRead` and `DuplicateName` are raised while the
/// migration source is enumerated, before anything touches the database.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// M001: The migration source origin does not exist
    #[error("[M001] Migration source not found: {origin}")]
    SourceNotFound { origin: String },

    /// M002: A migration source entry could not be read
    #[error("[M002] Failed to read migration '{path}': {source}")]
    SourceRead {
        path: String,
        source: std::io::Error,
    },

    /// M003: Two migrations in one source share a name
    #[error("[M003] Duplicate migration name '{name}' in {origin}")]
    DuplicateName { name: String, origin: String },

    /// M004: Migration content is not valid UTF-8 text
    #[error("[M004] Migration '{name}' is not valid UTF-8")]
    InvalidEncoding { name: String },

    /// M005: A migration's statement batch failed
    #[error("[M005] Migration '{name}' failed to execute: {source}")]
    Execution {
        name: String,
        #[source]
        source: DbError,
    },

    /// M006: The bookkeeping table could not be created, queried or updated
    #[error("[M006] Migration bookkeeping failed while {action}: {source}")]
    Bookkeeping {
        action: String,
        #[source]
        source: DbError,
    },

    /// M007: BEGIN / COMMIT around a migration failed
    #[error("[M007] Migration transaction failed: {0}")]
    Transaction(#[from] DbError),
}

/// Result type alias for [`MigrationError`].
pub type MigrationResult<T> = Result<T, MigrationError>;

impl MigrationError {
    /// Whether the error happened while enumerating the migration source.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            MigrationError::SourceNotFound { .. }
                | MigrationError::SourceRead { .. }
                | MigrationError::DuplicateName { .. }
        )
    }

    pub(crate) fn bookkeeping(action: impl Into<String>, source: DbError) -> Self {
        MigrationError::Bookkeeping {
            action: action.into(),
            source,
        }
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    NotFound { path: String },

    /// C002: Configuration file could not be read
    #[error("[C002] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// C003: Configuration file is not valid YAML for this schema
    #[error("[C003] Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// C004: Invalid configuration value
    #[error("[C004] Invalid config: {message}")]
    Invalid { message: String },
}

/// Result type alias for [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
