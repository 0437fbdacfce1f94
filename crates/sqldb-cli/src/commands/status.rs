//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sqldb::{MigrationRecord, MigrationRunner};

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{load_project, print_table};

#[derive(Debug, Serialize)]
struct AppliedEntry {
    file: String,
    md5: String,
    applied_at: String,
}

impl From<&MigrationRecord> for AppliedEntry {
    fn from(record: &MigrationRecord) -> Self {
        Self {
            file: record.name.clone(),
            md5: record.checksum.to_string(),
            applied_at: record.applied_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    database: String,
    backend: String,
    applied: Vec<AppliedEntry>,
    pending: Vec<String>,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let source = project.source(args.dir.as_deref());
    let db = project.connect()?;
    let runner = MigrationRunner::new(&db);

    let applied = runner
        .applied()
        .context("Failed to read applied migrations")?;
    let pending = runner
        .pending(&source)
        .with_context(|| format!("Failed to read migrations from {}", source.path().display()))?;

    let report = StatusReport {
        database: project.config.database_path_absolute(&project.root),
        backend: project.config.database.db_type.to_string(),
        applied: applied.iter().map(AppliedEntry::from).collect(),
        pending: pending.into_iter().map(|s| s.name).collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Database: {} ({})", report.database, report.backend);
    println!();
    if report.applied.is_empty() {
        println!("No migrations applied.");
    } else {
        let rows: Vec<Vec<String>> = report
            .applied
            .iter()
            .map(|e| vec![e.file.clone(), e.md5.clone(), e.applied_at.clone()])
            .collect();
        print_table(&["FILE", "MD5", "APPLIED AT"], &rows);
    }
    println!();
    if report.pending.is_empty() {
        println!("Up to date.");
    } else {
        println!("Pending ({}):", report.pending.len());
        for name in &report.pending {
            println!("  {}", name);
        }
    }
    Ok(())
}
