//! Family-dispatching item store.
//!
//! # Responsibility
//! - Route persistence of any item to the repository of its family.
//!
//! # Invariants
//! - Dispatch is decided by `Item::family` only.

use crate::model::item::{Item, ItemFamily, ItemId};
use crate::repo::item_repo::{ItemRepoResult, ItemRepository};

/// Store used by folder use cases to load and persist items.
pub trait ItemStore {
    /// Persists the mutable fields of a stored item.
    fn persist(&self, item: &Item) -> ItemRepoResult<()>;
    /// Loads one item of `family` by id.
    fn load(&self, family: ItemFamily, id: ItemId) -> ItemRepoResult<Option<Item>>;
}

/// Store backed by one repository per family.
pub struct FamilyStore<F, R> {
    files: F,
    recordings: R,
}

impl<F: ItemRepository, R: ItemRepository> FamilyStore<F, R> {
    pub fn new(files: F, recordings: R) -> Self {
        Self { files, recordings }
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn recordings(&self) -> &R {
        &self.recordings
    }

    /// Repository owning `family`, as a trait object.
    pub fn repository(&self, family: ItemFamily) -> &dyn ItemRepository {
        match family {
            ItemFamily::File => &self.files,
            ItemFamily::Recording => &self.recordings,
        }
    }
}

impl<F: ItemRepository, R: ItemRepository> ItemStore for FamilyStore<F, R> {
    fn persist(&self, item: &Item) -> ItemRepoResult<()> {
        self.repository(item.family).update_item(item)
    }

    fn load(&self, family: ItemFamily, id: ItemId) -> ItemRepoResult<Option<Item>> {
        self.repository(family).get_item(id)
    }
}
