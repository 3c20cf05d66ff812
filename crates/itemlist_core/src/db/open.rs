//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure busy timeout and run migrations before handing a connection out.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Every open attempt emits one `db_open` start event and one ok/error event.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::StoreConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file and applies all pending migrations.
///
/// The file is created when absent.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_logged("file", StoreConfig::default().busy_timeout(), || {
        Connection::open(path)
    })
}

/// Opens a private in-memory database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged(
        "memory",
        StoreConfig::default().busy_timeout(),
        Connection::open_in_memory,
    )
}

/// Opens the database described by `config`.
///
/// # Errors
/// - `DbError::Config` when the configuration is invalid.
/// - `DbError::Sqlite` when the file cannot be opened or bootstrapped.
/// - `DbError::UnsupportedSchemaVersion` for databases written by a newer build.
pub fn open_with_config(config: &StoreConfig) -> DbResult<Connection> {
    if config.in_memory {
        return open_logged("memory", config.busy_timeout(), Connection::open_in_memory);
    }

    config.validate()?;
    let path = config.database_path();
    open_logged("file", config.busy_timeout(), || Connection::open(&path))
}

fn open_logged(
    mode: &'static str,
    busy_timeout: Duration,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, busy_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
