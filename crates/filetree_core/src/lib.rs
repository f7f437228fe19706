//! Core logic for the conference file and recording tree.
//! Moving an item into a folder reparents it and re-scopes its owner, room
//! and group to the folder.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{
    GroupId, Item, ItemFamily, ItemId, ItemKind, ItemValidationError, OwnerId, RoomId,
};
pub use repo::item_repo::{ItemRepoError, ItemRepoResult, ItemRepository, SqliteItemRepository};
pub use repo::item_store::{FamilyStore, ItemStore};
pub use service::folder_service::{FolderService, FolderServiceError, MoveOutcome, MoveSummary};
pub use view::affordance::NodeAffordances;
pub use view::selection::SelectionTree;
pub use view::TreeView;

/// Minimal health-check API for smoke checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
