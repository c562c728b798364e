use jayamesh_core::db::migrations::latest_version;
use jayamesh_core::db::{open_db, open_db_in_memory, open_db_with_outcome, DbError};
use jayamesh_core::MigrationOutcome;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_every_table_without_data() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "projects",
        "sections",
        "goals",
        "tasks",
        "notes",
        "tags",
        "note_tags",
        "focus_sessions",
    ] {
        assert_table_exists(&conn, table);
    }
    assert_eq!(row_count(&conn, "projects"), 0);
}

#[test]
fn reopening_a_current_store_is_up_to_date() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jayamesh.sqlite3");

    let (conn_first, outcome) = open_db_with_outcome(&path).unwrap();
    assert_eq!(outcome, MigrationOutcome::Fresh);
    assert_eq!(row_count(&conn_first, "projects"), 0);
    drop(conn_first);

    let (conn_second, outcome) = open_db_with_outcome(&path).unwrap();
    assert_eq!(outcome, MigrationOutcome::UpToDate);
    assert_eq!(schema_version(&conn_second), latest_version());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn stale_store_is_dropped_and_reseeded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stale.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE projects (id INTEGER PRIMARY KEY, title TEXT);
         INSERT INTO projects (title) VALUES ('legacy');
         CREATE TABLE legacy_settings (key TEXT);
         PRAGMA user_version = 2;",
    )
    .unwrap();
    drop(conn);

    let (conn, outcome) = open_db_with_outcome(&path).unwrap();
    assert_eq!(outcome, MigrationOutcome::Reset { from_version: 2 });
    assert_eq!(schema_version(&conn), latest_version());

    let legacy: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'legacy_settings';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(legacy, 0);

    assert_eq!(row_count(&conn, "projects"), 1);
    assert_eq!(row_count(&conn, "sections"), 5);
    assert_eq!(row_count(&conn, "goals"), 6);
    assert_eq!(row_count(&conn, "tasks"), 16);
}

#[test]
fn unversioned_file_with_tables_is_treated_as_stale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unversioned.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE stray (id INTEGER);").unwrap();
    drop(conn);

    let (conn, outcome) = open_db_with_outcome(&path).unwrap();
    assert_eq!(outcome, MigrationOutcome::Reset { from_version: 0 });
    assert_eq!(row_count(&conn, "projects"), 1);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
