//! Item domain model.
//!
//! # Responsibility
//! - Define the record shown by the item list.
//! - Separate records awaiting an identity from persisted ones.
//!
//! # Invariants
//! - `Item::id` is assigned exactly once, by the store, at insertion.
//! - Records are never mutated in place after persistence.
//! - Names carry no uniqueness or validation constraint.

use serde::{Deserialize, Serialize};

/// Store-assigned identity of a persisted item.
///
/// Backed by an `INTEGER PRIMARY KEY AUTOINCREMENT` column, so values are
/// never reused for another item within one database.
pub type ItemId = i64;

/// Item that has not been persisted yet and therefore has no identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// User-supplied display name. Empty and duplicate names are allowed.
    pub name: String,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Persisted item row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity; deletion matches on this field only.
    pub id: ItemId,
    pub name: String,
}

impl Item {
    /// Rebuilds a persisted item from known identity and name.
    ///
    /// Used by read paths and by callers that only kept the id around.
    pub fn with_id(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
