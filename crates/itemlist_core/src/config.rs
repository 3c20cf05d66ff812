//! Store configuration.
//!
//! # Responsibility
//! - Describe where the item database lives and how its connection is tuned.
//! - Resolve the database file path from configuration.
//!
//! # Invariants
//! - `database_name` is a bare file name, never a path.
//! - Configuration is passed explicitly to constructors; there is no global.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Default database file name inside `data_dir`.
pub const DEFAULT_DATABASE_NAME: &str = "items_database";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration error raised by [`StoreConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDatabaseName,
    InvalidDatabaseName(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDatabaseName => write!(f, "database_name cannot be empty"),
            Self::InvalidDatabaseName(name) => {
                write!(f, "database_name must be a bare file name, got `{name}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings used by [`crate::store::ItemStore::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the database file.
    pub data_dir: PathBuf,
    /// File name of the database inside `data_dir`.
    pub database_name: String,
    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// Opens a private in-memory database instead of a file.
    pub in_memory: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            in_memory: false,
        }
    }
}

impl StoreConfig {
    /// File-backed configuration rooted at `data_dir`.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// In-memory configuration, mostly useful for tests and previews.
    pub fn in_memory() -> Self {
        Self {
            in_memory: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.database_name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyDatabaseName);
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ConfigError::InvalidDatabaseName(self.database_name.clone()));
        }
        Ok(())
    }

    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(self.database_name.trim())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DEFAULT_DATABASE_NAME};
    use std::path::PathBuf;

    #[test]
    fn default_points_at_items_database() {
        let config = StoreConfig::default();
        assert_eq!(config.database_name, DEFAULT_DATABASE_NAME);
        assert_eq!(config.database_path(), PathBuf::from("./items_database"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_path_like_names() {
        let mut config = StoreConfig::in_dir("/tmp");
        config.database_name = "nested/items".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDatabaseName("nested/items".to_string()))
        );

        config.database_name = "   ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyDatabaseName));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"data_dir":"/var/lib/items"}"#).expect("valid json");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/items"));
        assert_eq!(config.database_name, DEFAULT_DATABASE_NAME);
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert!(!config.in_memory);
    }
}
