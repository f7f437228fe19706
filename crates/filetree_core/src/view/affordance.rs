//! Drag, drop and rename gating for one tree node.

use crate::model::item::Item;
use crate::view::TreeView;

/// CSS class for nodes that may be dragged but never dropped anywhere.
pub const READ_ONLY_DRAG_CLASS: &str = "readonlyitem";

/// Interactions one node may offer, derived from item and tree permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAffordances {
    /// Tree and item are both writable.
    pub editable: bool,
    /// Node is a drop zone.
    pub accepts_drops: bool,
    /// Node can be picked up.
    pub draggable: bool,
    /// Label switches to an editor on double click.
    pub renamable: bool,
    /// Class attached to the drag handle, `None` when not draggable.
    pub drag_class: Option<&'static str>,
    /// Class of drag handles this drop zone accepts, `None` when not a zone.
    pub accept_class: Option<&'static str>,
    /// Tooltip text.
    pub title: String,
}

impl NodeAffordances {
    pub fn for_item(item: &Item, view: &impl TreeView) -> Self {
        let tree_read_only = view.is_read_only();
        let editable = !tree_read_only && !item.read_only;
        let accepts_drops = item.is_folder() && editable;
        let draggable = item.id.is_some() && !tree_read_only;
        let drag_class = draggable.then(|| {
            if item.read_only {
                READ_ONLY_DRAG_CLASS
            } else {
                item.family.drag_class()
            }
        });

        Self {
            editable,
            accepts_drops,
            draggable,
            renamable: item.id.is_some() && editable,
            drag_class,
            accept_class: accepts_drops.then(|| item.family.drag_class()),
            title: item.name.clone(),
        }
    }

    /// Whether a node with `dragged` affordances may be dropped here.
    pub fn accepts(&self, dragged: &NodeAffordances) -> bool {
        match (self.accept_class, dragged.drag_class) {
            (Some(accept), Some(drag)) => accept == drag,
            _ => false,
        }
    }
}
