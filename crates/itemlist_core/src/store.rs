//! Observable item store.
//!
//! # Responsibility
//! - Own the single connection to the item table.
//! - Publish a fresh select-all snapshot after every effective mutation.
//!
//! # Invariants
//! - Snapshots are published while the connection lock is held, so the
//!   published order always matches the mutation order.
//! - A delete that matches no row publishes nothing.
//! - Subscribers never see a partially applied mutation.

use crate::config::StoreConfig;
use crate::db::{open_with_config, DbError, DbResult};
use crate::model::item::{Item, ItemId, NewItem};
use crate::repo::item_repo::{ItemRepository, RepoError, SqliteItemRepository};
use log::{debug, error};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Immutable full list of items at one point in time.
pub type ItemSnapshot = Arc<Vec<Item>>;

/// Subscription to the live item list. Drop it to unsubscribe.
pub type ItemListReceiver = watch::Receiver<ItemSnapshot>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Operation-time store failure.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    /// A previous writer panicked while holding the connection.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "item store connection lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Durable item table with a push-based select-all stream.
pub struct ItemStore {
    conn: Mutex<Connection>,
    snapshots: watch::Sender<ItemSnapshot>,
}

impl ItemStore {
    /// Opens (creating if absent) the database described by `config`.
    ///
    /// # Errors
    /// Returns the construction-time `DbError` for unreadable files, schema
    /// mismatches and invalid configuration.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let conn = open_with_config(config)?;
        Self::from_connection(conn)
    }

    /// Wraps an already migrated connection and loads the initial snapshot.
    pub fn from_connection(conn: Connection) -> DbResult<Self> {
        let initial = SqliteItemRepository::new(&conn)
            .get_all()
            .map_err(|err| match err {
                RepoError::Db(db) => db,
                RepoError::InvalidData(message) => DbError::CorruptData(message),
            })?;
        debug!(
            "event=store_open module=store status=ok item_count={}",
            initial.len()
        );

        let (snapshots, _) = watch::channel(Arc::new(initial));
        Ok(Self {
            conn: Mutex::new(conn),
            snapshots,
        })
    }

    /// Subscribes to the live item list.
    ///
    /// The receiver holds the current snapshot immediately and is notified on
    /// every subsequent insert or effective delete.
    pub fn get_all(&self) -> ItemListReceiver {
        self.snapshots.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> ItemSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Persists `item`, assigns its identity and publishes a new snapshot.
    pub fn insert(&self, item: &NewItem) -> StoreResult<ItemId> {
        let conn = self.lock()?;
        let repo = SqliteItemRepository::new(&conn);

        let id = repo.insert(item).inspect_err(|err| {
            error!("event=item_insert module=store status=error error={err}");
        })?;
        let count = self.publish(&repo)?;
        debug!("event=item_insert module=store status=ok item_id={id} item_count={count}");
        Ok(id)
    }

    /// Deletes the row matching `item.id`.
    ///
    /// Returns `false`, without publishing, when no row matched.
    pub fn delete(&self, item: &Item) -> StoreResult<bool> {
        let conn = self.lock()?;
        let repo = SqliteItemRepository::new(&conn);

        let removed = repo.delete(item).inspect_err(|err| {
            error!(
                "event=item_delete module=store status=error item_id={} error={err}",
                item.id
            );
        })?;
        if !removed {
            debug!(
                "event=item_delete module=store status=noop item_id={}",
                item.id
            );
            return Ok(false);
        }

        let count = self.publish(&repo)?;
        debug!(
            "event=item_delete module=store status=ok item_id={} item_count={count}",
            item.id
        );
        Ok(true)
    }

    fn publish(&self, repo: &SqliteItemRepository<'_>) -> StoreResult<usize> {
        let items = repo.get_all()?;
        let count = items.len();
        self.snapshots.send_replace(Arc::new(items));
        Ok(count)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}
