//! Migrate command implementation

use anyhow::{Context, Result};
use sqldb::{MigrationRunner, RunnerOptions};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::load_project;

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let source = project.source(args.dir.as_deref());
    let db = project.connect()?;

    let options = RunnerOptions {
        atomic: project.config.atomic && !args.non_atomic,
    };
    let runner = MigrationRunner::with_options(&db, options);

    if args.dry_run {
        let pending = runner
            .pending(&source)
            .with_context(|| format!("Failed to plan migrations from {}", source.path().display()))?;
        if pending.is_empty() {
            println!("No pending migrations.");
            return Ok(());
        }
        println!("Would apply {} migration(s):", pending.len());
        for script in &pending {
            println!("  {}", script.name);
        }
        return Ok(());
    }

    let summary = runner
        .run(&source)
        .with_context(|| format!("Migrating from {} failed", source.path().display()))?;

    for name in &summary.applied {
        println!("  applied  {}", name);
    }
    println!(
        "Applied {} migration(s), {} already up to date.",
        summary.applied.len(),
        summary.skipped.len()
    );
    Ok(())
}
