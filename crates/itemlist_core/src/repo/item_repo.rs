//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the three table operations behind the item list:
//!   select-all, insert and delete.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Identity is assigned by SQLite on insert, never by callers.
//! - Delete matches on identity only and is a no-op for unknown rows.
//! - Select-all returns rows in insertion order.

use crate::db::{item_table, DbError, ITEM_TABLE};
use crate::model::item::{Item, ItemId, NewItem};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_ALL_SQL: &str =
    concat!("SELECT id, name FROM ", item_table!(), " ORDER BY id ASC;");
const ITEM_INSERT_SQL: &str = concat!("INSERT INTO ", item_table!(), " (name) VALUES (?1);");
const ITEM_DELETE_SQL: &str = concat!("DELETE FROM ", item_table!(), " WHERE id = ?1;");

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the item table.
pub trait ItemRepository {
    /// Returns every persisted item in insertion order.
    fn get_all(&self) -> RepoResult<Vec<Item>>;
    /// Persists `item` and returns the identity assigned to it.
    fn insert(&self, item: &NewItem) -> RepoResult<ItemId>;
    /// Deletes the row matching `item.id`.
    ///
    /// Returns `false` when no such row exists.
    fn delete(&self, item: &Item) -> RepoResult<bool>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare_cached(ITEM_SELECT_ALL_SQL)?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn insert(&self, item: &NewItem) -> RepoResult<ItemId> {
        self.conn
            .prepare_cached(ITEM_INSERT_SQL)?
            .execute(params![item.name.as_str()])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete(&self, item: &Item) -> RepoResult<bool> {
        let changed = self
            .conn
            .prepare_cached(ITEM_DELETE_SQL)?
            .execute(params![item.id])?;
        Ok(changed > 0)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id: ItemId = row.get("id")?;
    if id <= 0 {
        return Err(RepoError::InvalidData(format!(
            "invalid id value `{id}` in {ITEM_TABLE}.id"
        )));
    }

    Ok(Item {
        id,
        name: row.get("name")?,
    })
}
