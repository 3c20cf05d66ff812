//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for the item table.
//! - Isolate SQLite query details from the store and controller.
//!
//! # Invariants
//! - Repository APIs never publish snapshots; that is the store's job.

pub mod item_repo;
