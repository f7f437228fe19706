//! Tree view seam and in-memory selection tree.
//!
//! # Responsibility
//! - Define what the move service needs from the tree presenting items.
//! - Compute which drag/drop/rename affordances a node may offer.
//!
//! # Invariants
//! - Selected items are handed out as owned copies; the view observes
//!   mutations only through `refresh_node`.

pub mod affordance;
pub mod selection;

use crate::model::item::Item;
use std::collections::BTreeMap;

/// Tree presenting items and tracking the multi-selection.
pub trait TreeView {
    /// Whether the whole tree is shown read-only.
    fn is_read_only(&self) -> bool;
    /// Whether `item` is part of the current selection.
    fn is_selected(&self, item: &Item) -> bool;
    /// Current selection keyed by [`Item::key`].
    fn selected_items(&self) -> BTreeMap<String, Item>;
    /// Re-reads committed state for `item` and schedules a visual update.
    fn refresh_node(&mut self, item: &Item);
}
