//! File tree item model.
//!
//! # Responsibility
//! - Define the node shared by folders, files and recordings.
//! - Own the re-scoping rule applied when an item moves under a new parent.
//!
//! # Invariants
//! - `id` is assigned by the store once and never reassigned.
//! - An item is never its own parent.
//! - `kind` and `family` agree: recordings live in the recording family,
//!   plain files in the file family, folders in either.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned item identity.
pub type ItemId = i64;
/// Owning principal identity.
pub type OwnerId = i64;
/// Conference room identity.
pub type RoomId = i64;
/// User group identity.
pub type GroupId = i64;

/// Node category shown by the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Container that accepts drops.
    Folder,
    /// Uploaded document or media file.
    File,
    /// Conference recording.
    Recording,
}

impl ItemKind {
    /// Stable string stored in the `type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
            Self::Recording => "recording",
        }
    }

    /// Parses the stored `type` column value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "folder" => Some(Self::Folder),
            "file" => Some(Self::File),
            "recording" => Some(Self::Recording),
            _ => None,
        }
    }
}

/// Persistence family. Each family has its own store and its own tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFamily {
    /// Generic files and their folders.
    File,
    /// Recordings and recording folders.
    Recording,
}

impl ItemFamily {
    /// Backing SQLite table.
    pub fn table(self) -> &'static str {
        match self {
            Self::File => "file_items",
            Self::Recording => "recordings",
        }
    }

    /// CSS class marking draggable nodes of this family.
    pub fn drag_class(self) -> &'static str {
        match self {
            Self::File => "fileitem",
            Self::Recording => "recorditem",
        }
    }

    fn key_prefix(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Recording => "rec",
        }
    }
}

impl Display for ItemFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Recording => write!(f, "recording"),
        }
    }
}

/// Validation failures for [`Item`] state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// `kind` cannot live in `family`.
    KindFamilyMismatch { kind: ItemKind, family: ItemFamily },
    /// `parent_id` equals `id`.
    SelfParent(ItemId),
    /// Name is blank after trim.
    BlankName,
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KindFamilyMismatch { kind, family } => write!(
                f,
                "item kind `{}` cannot be stored in the {family} family",
                kind.as_str()
            ),
            Self::SelfParent(id) => write!(f, "item {id} cannot be its own parent"),
            Self::BlankName => write!(f, "item name must not be blank"),
        }
    }
}

impl Error for ItemValidationError {}

/// One node of the file/recording tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// `None` until the store inserts the item.
    pub id: Option<ItemId>,
    /// Serialized as `type` to match the storage column.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub family: ItemFamily,
    pub name: String,
    /// `None` means root-level node.
    pub parent_id: Option<ItemId>,
    pub owner_id: Option<OwnerId>,
    pub room_id: Option<RoomId>,
    pub group_id: Option<GroupId>,
    /// Blocks move and rename affordances.
    pub read_only: bool,
}

impl Item {
    /// Creates an unsaved root-level item.
    pub fn new(kind: ItemKind, family: ItemFamily, name: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            family,
            name: name.into(),
            parent_id: None,
            owner_id: None,
            room_id: None,
            group_id: None,
            read_only: false,
        }
    }

    /// Creates an unsaved folder in `family`.
    pub fn folder(family: ItemFamily, name: impl Into<String>) -> Self {
        Self::new(ItemKind::Folder, family, name)
    }

    /// Creates an unsaved generic file.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(ItemKind::File, ItemFamily::File, name)
    }

    /// Creates an unsaved recording.
    pub fn recording(name: impl Into<String>) -> Self {
        Self::new(ItemKind::Recording, ItemFamily::Recording, name)
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_parent(mut self, parent_id: Option<ItemId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_owner(mut self, owner_id: Option<OwnerId>) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_room(mut self, room_id: Option<RoomId>) -> Self {
        self.room_id = room_id;
        self
    }

    pub fn with_group(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    /// Selection key, unique across both families. `None` for unsaved items.
    pub fn key(&self) -> Option<String> {
        self.id
            .map(|id| format!("{}-{id}", self.family.key_prefix()))
    }

    /// Returns whether `self` and `other` are the same persisted node.
    ///
    /// Unsaved items are never the same node as anything.
    pub fn is_same_node(&self, other: &Item) -> bool {
        self.family == other.family && self.id.is_some() && self.id == other.id
    }

    /// Returns whether reparenting `self` under `target` would point it at
    /// its own id.
    ///
    /// Compares ids only: a folder and an item of the other family that
    /// share an id still count, so a move can never write `parent_id == id`.
    pub fn is_drop_on_self(&self, target: &Item) -> bool {
        target.id.is_some() && target.id == self.id
    }

    /// Reparents this item under `target` and adopts its owner/room/group
    /// scope.
    pub fn rescope_under(&mut self, target: &Item) {
        self.parent_id = target.id;
        self.owner_id = target.owner_id;
        self.room_id = target.room_id;
        self.group_id = target.group_id;
    }

    /// Checks model invariants before persistence.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        let allowed = match (self.kind, self.family) {
            (ItemKind::Folder, _) => true,
            (ItemKind::File, ItemFamily::File) => true,
            (ItemKind::Recording, ItemFamily::Recording) => true,
            _ => false,
        };
        if !allowed {
            return Err(ItemValidationError::KindFamilyMismatch {
                kind: self.kind,
                family: self.family,
            });
        }
        if let Some(id) = self.id {
            if self.parent_id == Some(id) {
                return Err(ItemValidationError::SelfParent(id));
            }
        }
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::BlankName);
        }
        Ok(())
    }
}
