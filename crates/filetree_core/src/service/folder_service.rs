//! Folder drop, move and rename use cases.
//!
//! # Responsibility
//! - Reparent items dropped on a folder and re-scope them to that folder.
//! - Move the whole multi-selection when a selected item is dragged.
//! - Commit label edits through the same family dispatch.
//!
//! # Invariants
//! - Dropping an item on itself changes nothing and persists nothing.
//! - A moved item takes `parent_id` from the target id and `owner_id`,
//!   `room_id`, `group_id` from the target.
//! - Callers only observe committed state: the item is updated in place
//!   after the store accepted it, and the view is refreshed afterwards.
//! - Batch moves are not atomic; items moved before a failure stay moved.

use crate::model::item::Item;
use crate::repo::item_repo::ItemRepoError;
use crate::repo::item_store::ItemStore;
use crate::view::TreeView;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from folder use cases.
#[derive(Debug)]
pub enum FolderServiceError {
    /// Label is blank after trim.
    InvalidName,
    /// Store rejected a single-item write.
    Store(ItemRepoError),
    /// Store rejected one write of a multi-selection move.
    BatchInterrupted {
        /// Items committed before the failure.
        moved: usize,
        /// Selection key of the item that failed.
        failed_key: String,
        source: ItemRepoError,
    },
}

impl Display for FolderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "item name must not be blank"),
            Self::Store(_) => write!(f, "item store rejected the write"),
            Self::BatchInterrupted {
                moved, failed_key, ..
            } => write!(
                f,
                "move of `{failed_key}` failed after {moved} item(s) were moved"
            ),
        }
    }
}

impl Error for FolderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName => None,
            Self::Store(err) => Some(err),
            Self::BatchInterrupted { source, .. } => Some(source),
        }
    }
}

impl From<ItemRepoError> for FolderServiceError {
    fn from(value: ItemRepoError) -> Self {
        Self::Store(value)
    }
}

/// Result of a single move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Item was re-scoped and persisted.
    Moved,
    /// Target is the dragged item itself.
    SkippedSelfTarget,
}

/// Committed items of a drop or multi-selection move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSummary {
    /// Committed state of every moved item, in move order.
    pub moved: Vec<Item>,
    /// Items left alone because they were the target.
    pub skipped: usize,
}

impl MoveSummary {
    fn record(&mut self, outcome: MoveOutcome, item: &Item) {
        match outcome {
            MoveOutcome::Moved => self.moved.push(item.clone()),
            MoveOutcome::SkippedSelfTarget => self.skipped += 1,
        }
    }
}

/// Folder use-case facade over an item store.
pub struct FolderService<S: ItemStore> {
    store: S,
}

impl<S: ItemStore> FolderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves `dragged` under `target`.
    ///
    /// Read-only flags are not re-checked here; callers gate the gesture
    /// with `NodeAffordances`.
    ///
    /// # Errors
    /// - `Store` when persistence fails; `dragged` is left untouched.
    pub fn move_item(
        &self,
        view: &mut impl TreeView,
        target: &Item,
        dragged: &mut Item,
    ) -> Result<MoveOutcome, FolderServiceError> {
        if dragged.is_drop_on_self(target) {
            debug!(
                "event=item_move module=folder status=skipped reason=self_target family={} item_id={}",
                dragged.family,
                format_id(dragged.id)
            );
            return Ok(MoveOutcome::SkippedSelfTarget);
        }

        let mut moved = dragged.clone();
        moved.rescope_under(target);
        if let Err(err) = self.store.persist(&moved) {
            error!(
                "event=item_move module=folder status=error family={} item_id={} parent_id={} error={}",
                moved.family,
                format_id(moved.id),
                format_id(moved.parent_id),
                err
            );
            return Err(err.into());
        }

        *dragged = moved;
        info!(
            "event=item_move module=folder status=ok family={} item_id={} parent_id={}",
            dragged.family,
            format_id(dragged.id),
            format_id(dragged.parent_id)
        );
        view.refresh_node(dragged);
        Ok(MoveOutcome::Moved)
    }

    /// Moves every selected item under `target`, one store write per item.
    ///
    /// # Errors
    /// - `BatchInterrupted` on the first failed write; earlier items remain
    ///   moved and later items are not attempted.
    pub fn move_all(
        &self,
        view: &mut impl TreeView,
        target: &Item,
    ) -> Result<MoveSummary, FolderServiceError> {
        let mut summary = MoveSummary::default();
        for (key, mut item) in view.selected_items() {
            match self.move_item(view, target, &mut item) {
                Ok(outcome) => summary.record(outcome, &item),
                Err(FolderServiceError::Store(source)) => {
                    warn!(
                        "event=item_move_all module=folder status=error moved={} skipped={} failed_key={}",
                        summary.moved.len(),
                        summary.skipped,
                        key
                    );
                    return Err(FolderServiceError::BatchInterrupted {
                        moved: summary.moved.len(),
                        failed_key: key,
                        source,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        info!(
            "event=item_move_all module=folder status=ok moved={} skipped={} target_id={}",
            summary.moved.len(),
            summary.skipped,
            format_id(target.id)
        );
        Ok(summary)
    }

    /// Handles `dragged` being dropped on `target`.
    ///
    /// A selected `dragged` moves the whole selection. `dragged` ends up
    /// holding its committed state either way, and the target node is
    /// refreshed last.
    pub fn handle_drop(
        &self,
        view: &mut impl TreeView,
        target: &Item,
        dragged: &mut Item,
    ) -> Result<MoveSummary, FolderServiceError> {
        let summary = if view.is_selected(dragged) {
            let summary = self.move_all(view, target)?;
            if let Some(committed) = summary
                .moved
                .iter()
                .find(|item| item.is_same_node(dragged))
            {
                *dragged = committed.clone();
            }
            summary
        } else {
            let mut summary = MoveSummary::default();
            let outcome = self.move_item(view, target, dragged)?;
            summary.record(outcome, dragged);
            summary
        };

        view.refresh_node(target);
        Ok(summary)
    }

    /// Sets a new label on `item` and persists it.
    ///
    /// Unlike assigning `name` directly, the label is trimmed and blank
    /// labels are refused before the store is called.
    ///
    /// # Errors
    /// - `InvalidName` when `name` is blank after trim.
    /// - `Store` when persistence fails; `item` is left untouched.
    pub fn rename_item(
        &self,
        view: &mut impl TreeView,
        item: &mut Item,
        name: impl Into<String>,
    ) -> Result<(), FolderServiceError> {
        let normalized = normalize_name(name.into())?;
        let mut renamed = item.clone();
        renamed.name = normalized;
        if let Err(err) = self.store.persist(&renamed) {
            error!(
                "event=item_rename module=folder status=error family={} item_id={} error={}",
                renamed.family,
                format_id(renamed.id),
                err
            );
            return Err(err.into());
        }

        *item = renamed;
        info!(
            "event=item_rename module=folder status=ok family={} item_id={}",
            item.family,
            format_id(item.id)
        );
        view.refresh_node(item);
        Ok(())
    }
}

fn normalize_name(value: String) -> Result<String, FolderServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FolderServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}

fn format_id(id: Option<i64>) -> String {
    id.map_or_else(|| "none".to_string(), |value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::{FolderService, FolderServiceError, MoveOutcome};
    use crate::model::item::{Item, ItemFamily, ItemId};
    use crate::repo::item_repo::{ItemRepoError, ItemRepoResult};
    use crate::repo::item_store::ItemStore;
    use crate::view::selection::SelectionTree;
    use crate::view::TreeView;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingStore {
        updates: RefCell<Vec<Item>>,
        fail_on_call: Option<usize>,
        calls: Cell<usize>,
    }

    impl RecordingStore {
        fn failing_on(call: usize) -> Self {
            Self {
                fail_on_call: Some(call),
                ..Self::default()
            }
        }
    }

    impl ItemStore for RecordingStore {
        fn persist(&self, item: &Item) -> ItemRepoResult<()> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if self.fail_on_call == Some(call) {
                return Err(ItemRepoError::NotFound {
                    family: item.family,
                    id: item.id.unwrap_or_default(),
                });
            }
            self.updates.borrow_mut().push(item.clone());
            Ok(())
        }

        fn load(&self, _family: ItemFamily, _id: ItemId) -> ItemRepoResult<Option<Item>> {
            Ok(None)
        }
    }

    fn folder(id: ItemId) -> Item {
        Item::folder(ItemFamily::File, format!("folder-{id}")).with_id(id)
    }

    fn file(id: ItemId) -> Item {
        Item::file(format!("file-{id}")).with_id(id)
    }

    #[test]
    fn move_rescopes_item_and_persists_once() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let target = folder(9).with_owner(Some(3)).with_room(Some(55));
        let mut dragged = file(42).with_owner(Some(7));

        let outcome = service.move_item(&mut tree, &target, &mut dragged).unwrap();

        assert_eq!(outcome, MoveOutcome::Moved);
        let expected = file(42).with_parent(Some(9)).with_owner(Some(3)).with_room(Some(55));
        assert_eq!(dragged, expected);
        assert_eq!(*service.store().updates.borrow(), vec![expected.clone()]);
        assert_eq!(tree.refreshed(), &[expected]);
    }

    #[test]
    fn move_copies_every_scope_field_from_target() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let target = folder(5)
            .with_owner(Some(2))
            .with_room(Some(1))
            .with_group(Some(1));
        let mut dragged = file(8)
            .with_parent(Some(4))
            .with_owner(Some(6))
            .with_room(Some(7))
            .with_group(Some(8));

        service.move_item(&mut tree, &target, &mut dragged).unwrap();

        assert_eq!(dragged.parent_id, Some(5));
        assert_eq!(dragged.owner_id, Some(2));
        assert_eq!(dragged.room_id, Some(1));
        assert_eq!(dragged.group_id, Some(1));
    }

    #[test]
    fn move_onto_itself_is_a_silent_no_op() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let target = folder(9).with_owner(Some(3));
        let mut dragged = target.clone();
        let before = dragged.clone();

        let outcome = service.move_item(&mut tree, &target, &mut dragged).unwrap();

        assert_eq!(outcome, MoveOutcome::SkippedSelfTarget);
        assert_eq!(dragged, before);
        assert_eq!(service.store().calls.get(), 0);
        assert!(tree.refreshed().is_empty());
    }

    #[test]
    fn move_onto_other_family_item_with_same_id_is_skipped() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let target = Item::folder(ItemFamily::File, "Docs")
            .with_id(1)
            .with_owner(Some(3));
        let mut dragged = Item::recording("kickoff").with_id(1).with_owner(Some(7));
        let before = dragged.clone();

        let outcome = service.move_item(&mut tree, &target, &mut dragged).unwrap();

        assert_eq!(outcome, MoveOutcome::SkippedSelfTarget);
        assert_eq!(dragged, before);
        assert_eq!(dragged.parent_id, None);
        assert_eq!(service.store().calls.get(), 0);
        assert!(tree.refreshed().is_empty());
    }

    #[test]
    fn move_under_unsaved_target_clears_parent() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let target = Item::folder(ItemFamily::File, "root").with_owner(Some(1));
        let mut dragged = file(3).with_parent(Some(2));

        service.move_item(&mut tree, &target, &mut dragged).unwrap();

        assert_eq!(dragged.parent_id, None);
        assert_eq!(dragged.owner_id, Some(1));
    }

    #[test]
    fn failed_move_leaves_item_untouched_and_propagates() {
        let service = FolderService::new(RecordingStore::failing_on(1));
        let mut tree = SelectionTree::new(false);
        let target = folder(9).with_owner(Some(3));
        let mut dragged = file(42).with_owner(Some(7));
        let before = dragged.clone();

        let err = service
            .move_item(&mut tree, &target, &mut dragged)
            .unwrap_err();

        assert!(matches!(err, FolderServiceError::Store(ItemRepoError::NotFound { id: 42, .. })));
        assert_eq!(dragged, before);
        assert!(tree.refreshed().is_empty());
    }

    #[test]
    fn move_all_persists_each_selected_item_separately() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        tree.select(&file(1));
        tree.select(&file(2));
        let target = folder(5);

        let summary = service.move_all(&mut tree, &target).unwrap();

        assert_eq!(summary.moved.len(), 2);
        assert_eq!(summary.skipped, 0);
        let updates = service.store().updates.borrow();
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|item| item.parent_id == Some(5)));
        assert!(tree
            .selected_items()
            .values()
            .all(|item| item.parent_id == Some(5)));
    }

    #[test]
    fn move_all_matches_sequential_single_moves() {
        let target = folder(5).with_owner(Some(2)).with_group(Some(4));
        let originals = [file(1).with_owner(Some(9)), file(2), file(3).with_room(Some(8))];

        let batch_service = FolderService::new(RecordingStore::default());
        let mut batch_tree = SelectionTree::new(false);
        for item in &originals {
            batch_tree.select(item);
        }
        batch_service.move_all(&mut batch_tree, &target).unwrap();

        let single_service = FolderService::new(RecordingStore::default());
        let mut single_tree = SelectionTree::new(false);
        let mut singles = originals.clone();
        for item in singles.iter_mut().rev() {
            single_service
                .move_item(&mut single_tree, &target, item)
                .unwrap();
        }

        let mut batch_updates = batch_service.store().updates.borrow().clone();
        batch_updates.sort_by_key(|item| item.id);
        assert_eq!(batch_updates, singles.to_vec());
    }

    #[test]
    fn move_all_skips_the_target_when_it_is_selected() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let target = folder(5);
        tree.select(&target);
        tree.select(&file(1));

        let summary = service.move_all(&mut tree, &target).unwrap();

        assert_eq!(summary.moved.len(), 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(service.store().updates.borrow().len(), 1);
    }

    #[test]
    fn move_all_stops_at_first_failure_without_rollback() {
        let service = FolderService::new(RecordingStore::failing_on(2));
        let mut tree = SelectionTree::new(false);
        tree.select(&file(1));
        tree.select(&file(2));
        tree.select(&file(3));

        let err = service.move_all(&mut tree, &folder(5)).unwrap_err();

        match err {
            FolderServiceError::BatchInterrupted {
                moved, failed_key, ..
            } => {
                assert_eq!(moved, 1);
                assert_eq!(failed_key, "file-2");
            }
            other => panic!("unexpected error: {other}"),
        }
        let selected = tree.selected_items();
        assert_eq!(selected["file-1"].parent_id, Some(5));
        assert_eq!(selected["file-2"].parent_id, None);
        assert_eq!(selected["file-3"].parent_id, None);
        assert_eq!(service.store().calls.get(), 2);
    }

    #[test]
    fn batch_error_names_failed_key_and_keeps_cause_in_source() {
        let service = FolderService::new(RecordingStore::failing_on(1));
        let mut tree = SelectionTree::new(false);
        tree.select(&file(4));

        let err = service.move_all(&mut tree, &folder(5)).unwrap_err();

        assert_eq!(
            err.to_string(),
            "move of `file-4` failed after 0 item(s) were moved"
        );
        let cause = std::error::Error::source(&err).unwrap();
        assert_eq!(cause.to_string(), "file item not found: 4");
    }

    #[test]
    fn drop_of_selected_item_moves_whole_selection() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let mut dragged = file(1);
        tree.select(&dragged);
        tree.select(&file(2));
        let target = folder(5);

        let summary = service.handle_drop(&mut tree, &target, &mut dragged).unwrap();

        assert_eq!(summary.moved.len(), 2);
        assert_eq!(dragged.parent_id, Some(5));
        assert_eq!(service.store().updates.borrow().len(), 2);
        assert_eq!(tree.refreshed().last(), Some(&target));
    }

    #[test]
    fn drop_of_unselected_item_moves_only_that_item() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        tree.select(&file(2));
        let mut dragged = file(1);
        let target = folder(5);

        let summary = service.handle_drop(&mut tree, &target, &mut dragged).unwrap();

        assert_eq!(summary.moved, vec![dragged.clone()]);
        assert_eq!(dragged.parent_id, Some(5));
        assert_eq!(tree.selected_items()["file-2"].parent_id, None);
        let refreshed = tree.refreshed();
        assert_eq!(refreshed.len(), 2);
        assert_eq!(refreshed[0], dragged);
        assert_eq!(refreshed[1], target);
    }

    #[test]
    fn self_drop_still_refreshes_target() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let target = folder(9);
        let mut dragged = target.clone();

        let summary = service.handle_drop(&mut tree, &target, &mut dragged).unwrap();

        assert!(summary.moved.is_empty());
        assert_eq!(summary.skipped, 1);
        assert_eq!(service.store().calls.get(), 0);
        assert_eq!(tree.refreshed(), &[target]);
    }

    #[test]
    fn rename_trims_and_persists() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let mut item = Item::recording("old").with_id(4);

        service.rename_item(&mut tree, &mut item, "  Kickoff  ").unwrap();

        assert_eq!(item.name, "Kickoff");
        assert_eq!(*service.store().updates.borrow(), vec![item.clone()]);
    }

    #[test]
    fn rename_rejects_blank_name() {
        let service = FolderService::new(RecordingStore::default());
        let mut tree = SelectionTree::new(false);
        let mut item = file(4);

        let err = service.rename_item(&mut tree, &mut item, "   ").unwrap_err();

        assert!(matches!(err, FolderServiceError::InvalidName));
        assert_eq!(item.name, "file-4");
        assert_eq!(service.store().calls.get(), 0);
    }
}
