//! In-memory tree view with multi-selection.

use crate::model::item::Item;
use crate::view::TreeView;
use std::collections::BTreeMap;

/// Selection state plus the last committed snapshot of every refreshed node.
#[derive(Debug, Default)]
pub struct SelectionTree {
    read_only: bool,
    selected: BTreeMap<String, Item>,
    nodes: BTreeMap<String, Item>,
    refreshed: Vec<Item>,
}

impl SelectionTree {
    pub fn new(read_only: bool) -> Self {
        Self {
            read_only,
            ..Self::default()
        }
    }

    /// Adds `item` to the selection. Unsaved items cannot be selected.
    pub fn select(&mut self, item: &Item) -> bool {
        match item.key() {
            Some(key) => {
                self.selected.insert(key, item.clone());
                true
            }
            None => false,
        }
    }

    /// Removes `item` from the selection, returning whether it was selected.
    pub fn deselect(&mut self, item: &Item) -> bool {
        item.key()
            .is_some_and(|key| self.selected.remove(&key).is_some())
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    /// Last committed snapshot of a refreshed node.
    pub fn node(&self, key: &str) -> Option<&Item> {
        self.nodes.get(key)
    }

    /// Every refresh in call order.
    pub fn refreshed(&self) -> &[Item] {
        &self.refreshed
    }
}

impl TreeView for SelectionTree {
    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn is_selected(&self, item: &Item) -> bool {
        item.key()
            .is_some_and(|key| self.selected.contains_key(&key))
    }

    fn selected_items(&self) -> BTreeMap<String, Item> {
        self.selected.clone()
    }

    fn refresh_node(&mut self, item: &Item) {
        if let Some(key) = item.key() {
            if let Some(selected) = self.selected.get_mut(&key) {
                *selected = item.clone();
            }
            self.nodes.insert(key, item.clone());
        }
        self.refreshed.push(item.clone());
    }
}
