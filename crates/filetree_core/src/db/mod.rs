//! SQLite storage for the file and recording trees.
//!
//! # Responsibility
//! - Open connections with foreign keys enforced, so every `parent_id`
//!   points at a stored item of the same family table.
//! - Bring the `file_items` / `recordings` schema up to date.
//! - Refuse databases whose tree links are already broken.
//!
//! # Invariants
//! - A connection handed out by `open_db*` has `foreign_keys=ON`, the latest
//!   schema, and no dangling `parent_id`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or upgrading the tree database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// SQLite ignored `PRAGMA foreign_keys = ON`; parent links would go
    /// unchecked.
    ForeignKeysUnavailable,
    /// A stored item points at a parent row that does not exist.
    DanglingParent {
        table: String,
        item_id: i64,
        parent_id: Option<i64>,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(_) => write!(f, "sqlite error"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "tree schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::ForeignKeysUnavailable => {
                write!(f, "sqlite build does not enforce foreign keys")
            }
            Self::DanglingParent {
                table,
                item_id,
                parent_id,
            } => match parent_id {
                Some(parent_id) => write!(
                    f,
                    "{table} row {item_id} references missing parent {parent_id}"
                ),
                None => write!(f, "{table} row {item_id} references a missing parent"),
            },
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
