//! Domain model for the file and recording trees.
//!
//! # Responsibility
//! - Define the item shape shared by both persistence families.
//! - Keep the move re-scoping rule next to the data it mutates.
//!
//! # Invariants
//! - Every persisted item is identified by a store-assigned `ItemId`.
//! - `ItemFamily` alone selects the persistence path.

pub mod item;
