//! Configuration types and parsing for sqldb.yml

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File names searched by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["sqldb.yml", "sqldb.yaml"];

/// Main configuration from sqldb.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Where migrations are read from
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Wrap execute+record of each migration in one transaction.
    ///
    /// Must be disabled for migrations that issue their own
    /// `BEGIN`/`COMMIT`.
    #[serde(default = "default_true")]
    pub atomic: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            migrations: MigrationsConfig::default(),
            atomic: true,
        }
    }
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// DuckDB
    DuckDb,
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::Sqlite => write!(f, "sqlite"),
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type (sqlite or duckdb)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

/// Migration discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    /// Directory holding migration files, relative to the project root
    #[serde(default = "default_migrations_path")]
    pub path: String,

    /// File extension recognised as a migration (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            path: default_migrations_path(),
            extension: default_extension(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_db_path() -> String {
    "sqldb.db".to_string()
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_extension() -> String {
    crate::source::DEFAULT_EXTENSION.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn parse(yaml: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for sqldb.yml or sqldb.yaml
    pub fn load_from_dir(dir: &Path) -> ConfigResult<Self> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .map_or_else(
                || {
                    Err(ConfigError::NotFound {
                        path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
                    })
                },
                |path| Self::load(&path),
            )
    }

    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.migrations.path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "migrations.path cannot be empty".to_string(),
            });
        }
        let ext = &self.migrations.extension;
        if ext.is_empty() || ext.starts_with('.') || ext.contains(|c: char| c == '/' || c == '\\') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "migrations.extension '{ext}' must be a bare extension such as 'sql'"
                ),
            });
        }
        Ok(())
    }

    /// Get the migrations directory resolved against `root`
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations.path)
    }

    /// Get the database path resolved against `root`.
    ///
    /// `:memory:` is returned unchanged.
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.path == ":memory:" {
            return self.database.path.clone();
        }
        root.join(&self.database.path).display().to_string()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
