//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-family data access contracts for files and recordings.
//! - Isolate SQLite query details from folder use cases.
//!
//! # Invariants
//! - Repository writes must enforce `Item::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `MissingId`) in
//!   addition to DB transport errors.

pub mod item_repo;
pub mod item_store;
