//! Domain model for the persisted item list.
//!
//! # Responsibility
//! - Define canonical data structures used by store and controller.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `ItemId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod item;
