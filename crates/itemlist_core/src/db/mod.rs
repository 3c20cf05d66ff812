//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure the single SQLite connection behind the item store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Item data is never read or written before migrations succeed.
//! - A database newer than this binary understands is rejected, not touched.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_with_config};

/// Expands to the item table name as a string literal, for `concat!` SQL.
macro_rules! item_table {
    () => {
        "ItemModel"
    };
}
pub(crate) use item_table;

/// Name of the only table owned by the item store.
pub const ITEM_TABLE: &str = item_table!();

pub type DbResult<T> = Result<T, DbError>;

/// Storage-open and schema errors.
///
/// These surface at construction time, separately from per-write failures.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Config(crate::config::ConfigError),
    CorruptData(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Config(err) => write!(f, "invalid store config: {err}"),
            Self::CorruptData(message) => write!(f, "corrupt item table: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::Config(err) => Some(err),
            Self::CorruptData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<crate::config::ConfigError> for DbError {
    fn from(value: crate::config::ConfigError) -> Self {
        Self::Config(value)
    }
}
