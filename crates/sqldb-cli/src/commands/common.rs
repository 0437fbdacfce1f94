//! Shared helpers for CLI commands.

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use sqldb::{Config, ConfigError, DirectorySource, StatementExecutor};
use std::path::{Path, PathBuf};

/// Resolved configuration plus the project root it is relative to.
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Open the configured database.
    pub(crate) fn connect(&self) -> Result<Box<dyn StatementExecutor>> {
        let mut database = self.config.database.clone();
        database.path = self.config.database_path_absolute(&self.root);
        log::debug!("Opening {} database at {}", database.db_type, database.path);
        sqldb::connect(&database)
            .with_context(|| format!("Failed to open database {}", database.path))
    }

    /// Migration source for the configured (or overridden) directory.
    pub(crate) fn source(&self, dir_override: Option<&str>) -> DirectorySource {
        let dir = match dir_override {
            Some(dir) => self.root.join(dir),
            None => self.config.migrations_path_absolute(&self.root),
        };
        DirectorySource::with_extension(dir, &self.config.migrations.extension)
    }
}

/// Load configuration and apply command-line overrides.
///
/// An explicit `--config` must exist. Otherwise `sqldb.yml` in the project
/// directory is used when present and built-in defaults when not.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let mut config = match &global.config {
        Some(path) => Config::load(Path::new(path)).context("Failed to load config")?,
        None => match Config::load_from_dir(&root) {
            Ok(config) => config,
            Err(ConfigError::NotFound { .. }) => {
                log::debug!("No sqldb.yml in {}, using defaults", root.display());
                Config::default()
            }
            Err(e) => return Err(e).context("Failed to load config"),
        },
    };

    if let Some(path) = &global.database {
        config.database.path = path.clone();
    }
    if let Some(backend) = global.backend {
        config.database.db_type = backend.into();
    }

    Ok(Project { root, config })
}

/// Calculate column widths for table output.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a formatted table to stdout.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(project_dir: &str) -> GlobalArgs {
        GlobalArgs {
            verbose: false,
            project_dir: project_dir.to_string(),
            config: None,
            database: None,
            backend: None,
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = load_project(&global(dir.path().to_str().unwrap())).unwrap();
        assert_eq!(project.config, Config::default());
    }

    #[test]
    fn test_overrides_apply() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sqldb.yml"), "database:\n  path: app.db\n").unwrap();
        let mut args = global(dir.path().to_str().unwrap());
        args.database = Some(":memory:".to_string());
        args.backend = Some(crate::cli::Backend::Duckdb);

        let project = load_project(&args).unwrap();
        assert_eq!(project.config.database.path, ":memory:");
        assert_eq!(project.config.database.db_type, sqldb::DbType::DuckDb);
    }

    #[test]
    fn test_database_override_is_relative_to_project_dir() {
        let mut args = global("/srv/app");
        args.database = Some("data/app.db".to_string());

        let project = load_project(&args).unwrap();
        assert_eq!(
            project.config.database_path_absolute(&project.root),
            Path::new("/srv/app/data/app.db").display().to_string()
        );
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let mut args = global(".");
        args.config = Some("/definitely/not/here.yml".to_string());
        assert!(load_project(&args).is_err());
    }

    #[test]
    fn test_invalid_config_is_not_replaced_by_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sqldb.yml"), "database:\n  type: oracle\n").unwrap();
        assert!(load_project(&global(dir.path().to_str().unwrap())).is_err());
    }

    #[test]
    fn test_source_override_is_relative_to_root() {
        let project = Project {
            root: PathBuf::from("/srv/app"),
            config: Config::default(),
        };
        assert_eq!(
            project.source(None).path(),
            Path::new("/srv/app/migrations")
        );
        assert_eq!(
            project.source(Some("db")).path(),
            Path::new("/srv/app/db")
        );
    }

    #[test]
    fn test_column_widths() {
        let rows = vec![vec!["0001_init.sql".to_string(), "x".to_string()]];
        assert_eq!(calculate_column_widths(&["NAME", "MD5"], &rows), vec![13, 3]);
    }
}
