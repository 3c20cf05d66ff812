//! Core logic for the persisted item list.
//! Owns the item table, its live snapshot stream and the list controller.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{ConfigError, StoreConfig, DEFAULT_DATABASE_NAME};
pub use controller::ItemListController;
pub use db::{DbError, DbResult};
pub use logging::{init_logging, logging_status, LogLevel, LoggingConfig, LoggingError};
pub use model::item::{Item, ItemId, NewItem};
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use store::{ItemListReceiver, ItemSnapshot, ItemStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
