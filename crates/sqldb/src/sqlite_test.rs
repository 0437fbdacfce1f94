use super::*;

#[derive(RustEmbed)]
#[folder = "tests/fixtures/embedded/"]
struct Bundle;

fn seeded() -> SqliteDb {
    let db = SqliteDb::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t (a TEXT, b INT, c REAL);
         INSERT INTO t VALUES ('foo', 42, 1.5);
         INSERT INTO t VALUES (NULL, 7, NULL);",
    )
    .unwrap();
    db
}

#[test]
fn test_in_memory() {
    let db = SqliteDb::open_in_memory().unwrap();
    assert_eq!(db.db_type(), "sqlite");
}

#[test]
fn test_new_memory_special_case() {
    let db = SqliteDb::new(":memory:").unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").unwrap();
}

#[test]
fn test_open_file_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    assert!(!path.exists());
    let db = SqliteDb::open(&path).unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").unwrap();
    assert!(path.exists());
}

#[test]
fn test_open_missing_parent_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no").join("such").join("app.db");
    let result = SqliteDb::open(&path);
    assert!(matches!(result, Err(DbError::ConnectionError(_))));
}

#[test]
fn test_execute_with_params() {
    let db = seeded();
    let changed = db
        .execute("UPDATE t SET b = ? WHERE a = ?", &["43", "foo"])
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(
        db.query_optional("SELECT b FROM t WHERE a = ?", &["foo"])
            .unwrap()
            .as_deref(),
        Some("43")
    );
}

#[test]
fn test_execute_error() {
    let db = seeded();
    let err = db.execute("INSERT INTO missing VALUES (?)", &["x"]).unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));
}

#[test]
fn test_execute_batch_error() {
    let db = SqliteDb::open_in_memory().unwrap();
    let err = db.execute_batch("CREATE TABLE (").unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));
}

#[test]
fn test_query_optional_no_rows() {
    let db = seeded();
    let found = db
        .query_optional("SELECT a FROM t WHERE a = ?", &["bar"])
        .unwrap();
    assert_eq!(found, None);
}

#[test]
fn test_query_optional_first_row_only() {
    let db = seeded();
    let found = db
        .query_optional("SELECT b FROM t ORDER BY b", &[])
        .unwrap();
    assert_eq!(found.as_deref(), Some("7"));
}

#[test]
fn test_query_rows_coerces_to_text() {
    let db = seeded();
    let rows = db.query_rows("SELECT a, b, c FROM t ORDER BY b DESC", &[]).unwrap();
    assert_eq!(
        rows,
        vec![
            vec!["foo".to_string(), "42".to_string(), "1.5".to_string()],
            vec!["null".to_string(), "7".to_string(), "null".to_string()],
        ]
    );
}

#[test]
fn test_query_rows_bad_sql() {
    let db = seeded();
    let err = db.query_rows("SELECT nope FROM t", &[]).unwrap_err();
    assert!(matches!(err, DbError::QueryError(_)));
}

#[test]
fn test_run_migrations_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("0.sql"), "CREATE TABLE t (a TEXT, b INT);").unwrap();
    std::fs::write(
        dir.path().join("1.sql"),
        "INSERT INTO t (a, b) VALUES ('foo', 42);",
    )
    .unwrap();

    let db = SqliteDb::open_in_memory().unwrap();
    let first = db.run_migrations(dir.path()).unwrap();
    let second = db.run_migrations(dir.path()).unwrap();

    assert_eq!(first.applied, vec!["0.sql", "1.sql"]);
    assert!(second.applied.is_empty());
    assert_eq!(
        db.query_optional("SELECT COUNT(*) FROM t", &[]).unwrap().as_deref(),
        Some("1")
    );
}

#[test]
fn test_run_migrations_from_embed() {
    let db = SqliteDb::open_in_memory().unwrap();
    db.run_migrations_from_embed::<Bundle>().unwrap();
    // second run must not insert again
    db.run_migrations_from_embed::<Bundle>().unwrap();

    let rows = db
        .query_rows("SELECT a, b FROM test_migration_1", &[])
        .unwrap();
    assert_eq!(rows, vec![vec!["foo".to_string(), "42".to_string()]]);
}
