use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn parse_migrate_with_globals() {
    let cli = Cli::try_parse_from([
        "sqldb",
        "-p",
        "app",
        "--backend",
        "duckdb",
        "migrate",
        "--dir",
        "db/migrations",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(cli.global.project_dir, "app");
    assert_eq!(cli.global.backend, Some(Backend::Duckdb));
    let Commands::Migrate(args) = cli.command else {
        panic!("expected migrate");
    };
    assert_eq!(args.dir.as_deref(), Some("db/migrations"));
    assert!(args.dry_run);
    assert!(!args.non_atomic);
}

#[test]
fn parse_status_json_with_trailing_global() {
    let cli = Cli::try_parse_from(["sqldb", "status", "--json", "-d", ":memory:"]).unwrap();
    assert_eq!(cli.global.database.as_deref(), Some(":memory:"));
    assert!(matches!(cli.command, Commands::Status(StatusArgs { json: true, .. })));
}

#[test]
fn unknown_backend_rejected() {
    assert!(Cli::try_parse_from(["sqldb", "--backend", "postgres", "status"]).is_err());
}

#[test]
fn backend_maps_to_db_type() {
    assert_eq!(DbType::from(Backend::Sqlite), DbType::Sqlite);
    assert_eq!(DbType::from(Backend::Duckdb), DbType::DuckDb);
}
