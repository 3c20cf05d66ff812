use itemlist_core::db::migrations::{current_user_version, latest_version};
use itemlist_core::db::{open_db, open_db_in_memory, open_with_config, DbError, ITEM_TABLE};
use itemlist_core::{ConfigError, StoreConfig};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(latest_version(), 1);
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, ITEM_TABLE);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items_database");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO ItemModel (name) VALUES ('kept');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM ItemModel;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

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
fn open_with_config_creates_named_file_in_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::in_dir(dir.path());

    let conn = open_with_config(&config).unwrap();
    assert_table_exists(&conn, ITEM_TABLE);
    assert!(dir.path().join("items_database").exists());
}

#[test]
fn open_with_config_rejects_invalid_database_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoreConfig::in_dir(dir.path());
    config.database_name = "../escape".to_string();

    let err = open_with_config(&config).unwrap_err();
    assert!(matches!(
        err,
        DbError::Config(ConfigError::InvalidDatabaseName(_))
    ));
}

#[test]
fn plain_and_configured_opens_share_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let expected = StoreConfig::default().busy_timeout().as_millis() as i64;

    let from_path = open_db(dir.path().join("plain.db")).unwrap();
    let in_memory = open_db_in_memory().unwrap();
    let configured = open_with_config(&StoreConfig::in_dir(dir.path())).unwrap();

    assert_eq!(busy_timeout_ms(&from_path), expected);
    assert_eq!(busy_timeout_ms(&in_memory), expected);
    assert_eq!(busy_timeout_ms(&configured), expected);
}

#[test]
fn open_with_config_applies_custom_busy_timeout() {
    let mut config = StoreConfig::in_memory();
    config.busy_timeout_ms = 750;

    let conn = open_with_config(&config).unwrap();
    assert_eq!(busy_timeout_ms(&conn), 750);
}

fn busy_timeout_ms(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
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
