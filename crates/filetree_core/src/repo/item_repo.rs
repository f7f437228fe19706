//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide per-family persistence for file and recording trees.
//! - Keep SQL details inside the repository boundary.
//!
//! # Invariants
//! - Write paths call `Item::validate()` before SQL mutations.
//! - A repository only reads and writes items of its own family.
//! - Child listing is deterministic: folders first, then `name`, then `id`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{Item, ItemFamily, ItemId, ItemKind, ItemValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_COLUMNS: &[&str] = &[
    "id",
    "type",
    "name",
    "parent_id",
    "owner_id",
    "room_id",
    "group_id",
    "read_only",
    "created_at",
    "updated_at",
];

/// Result type used by item repository operations.
pub type ItemRepoResult<T> = Result<T, ItemRepoError>;

/// Errors from item repository operations.
#[derive(Debug)]
pub enum ItemRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Item failed model validation.
    Validation(ItemValidationError),
    /// No stored item with this id in the family.
    NotFound { family: ItemFamily, id: ItemId },
    /// Update requested for an item the store never inserted.
    MissingId(ItemFamily),
    /// Item was handed to the other family's repository.
    FamilyMismatch {
        expected: ItemFamily,
        actual: ItemFamily,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid item.
    InvalidData(String),
}

impl Display for ItemRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(_) => write!(f, "item store sqlite error"),
            Self::Validation(_) => write!(f, "item failed validation"),
            Self::NotFound { family, id } => write!(f, "{family} item not found: {id}"),
            Self::MissingId(family) => write!(f, "{family} item has no id yet"),
            Self::FamilyMismatch { expected, actual } => write!(
                f,
                "{actual} item cannot be stored by the {expected} repository"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "item repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "item repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "item repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid item data: {message}"),
        }
    }
}

impl Error for ItemRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for ItemRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ItemRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ItemValidationError> for ItemRepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Persistence contract for one item family.
pub trait ItemRepository {
    /// Family this repository stores.
    fn family(&self) -> ItemFamily;
    /// Inserts an unsaved item and returns it with its assigned id.
    fn create_item(&self, item: &Item) -> ItemRepoResult<Item>;
    /// Loads one item by id.
    fn get_item(&self, id: ItemId) -> ItemRepoResult<Option<Item>>;
    /// Writes name, parent and scope fields of a stored item.
    fn update_item(&self, item: &Item) -> ItemRepoResult<()>;
    /// Lists children under optional parent.
    fn list_children(&self, parent_id: Option<ItemId>) -> ItemRepoResult<Vec<Item>>;
}

/// SQLite-backed repository for one family table.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
    family: ItemFamily,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates repository for `family` from a migrated connection.
    pub fn try_new(conn: &'conn Connection, family: ItemFamily) -> ItemRepoResult<Self> {
        ensure_connection_ready(conn, family.table())?;
        Ok(Self { conn, family })
    }

    /// Repository for generic files and folders.
    pub fn files(conn: &'conn Connection) -> ItemRepoResult<Self> {
        Self::try_new(conn, ItemFamily::File)
    }

    /// Repository for recordings and recording folders.
    pub fn recordings(conn: &'conn Connection) -> ItemRepoResult<Self> {
        Self::try_new(conn, ItemFamily::Recording)
    }

    fn ensure_family(&self, item: &Item) -> ItemRepoResult<()> {
        if item.family != self.family {
            return Err(ItemRepoError::FamilyMismatch {
                expected: self.family,
                actual: item.family,
            });
        }
        Ok(())
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn family(&self) -> ItemFamily {
        self.family
    }

    fn create_item(&self, item: &Item) -> ItemRepoResult<Item> {
        self.ensure_family(item)?;
        item.validate()?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (
                    type,
                    name,
                    parent_id,
                    owner_id,
                    room_id,
                    group_id,
                    read_only
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                self.family.table()
            ),
            params![
                item.kind.as_str(),
                item.name,
                item.parent_id,
                item.owner_id,
                item.room_id,
                item.group_id,
                item.read_only,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_item(id)?.ok_or(ItemRepoError::NotFound {
            family: self.family,
            id,
        })
    }

    fn get_item(&self, id: ItemId) -> ItemRepoResult<Option<Item>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1;",
            ITEM_COLUMNS.join(", "),
            self.family.table()
        );
        let item = self
            .conn
            .query_row(&sql, [id], |row| Ok(parse_item_row(row, self.family)))
            .optional()?;
        item.transpose()
    }

    fn update_item(&self, item: &Item) -> ItemRepoResult<()> {
        self.ensure_family(item)?;
        let id = item.id.ok_or(ItemRepoError::MissingId(self.family))?;
        item.validate()?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET name = ?2,
                     parent_id = ?3,
                     owner_id = ?4,
                     room_id = ?5,
                     group_id = ?6,
                     read_only = ?7,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                self.family.table()
            ),
            params![
                id,
                item.name,
                item.parent_id,
                item.owner_id,
                item.room_id,
                item.group_id,
                item.read_only,
            ],
        )?;
        if changed == 0 {
            return Err(ItemRepoError::NotFound {
                family: self.family,
                id,
            });
        }
        Ok(())
    }

    fn list_children(&self, parent_id: Option<ItemId>) -> ItemRepoResult<Vec<Item>> {
        let filter = if parent_id.is_some() {
            "parent_id = ?1"
        } else {
            "parent_id IS NULL"
        };
        let sql = format!(
            "SELECT {}
             FROM {}
             WHERE {filter}
             ORDER BY CASE type WHEN 'folder' THEN 0 ELSE 1 END ASC, name ASC, id ASC;",
            ITEM_COLUMNS.join(", "),
            self.family.table()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match parent_id {
            Some(parent_id) => stmt.query([parent_id])?,
            None => stmt.query([])?,
        };

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row, self.family)?);
        }
        Ok(items)
    }
}

fn parse_item_row(row: &Row<'_>, family: ItemFamily) -> ItemRepoResult<Item> {
    let kind_text: String = row.get("type")?;
    let kind = ItemKind::parse(&kind_text).ok_or_else(|| {
        ItemRepoError::InvalidData(format!(
            "invalid item type `{kind_text}` in {}.type",
            family.table()
        ))
    })?;

    let read_only = match row.get::<_, i64>("read_only")? {
        0 => false,
        1 => true,
        other => {
            return Err(ItemRepoError::InvalidData(format!(
                "invalid read_only value `{other}` in {}.read_only",
                family.table()
            )));
        }
    };

    let item = Item {
        id: Some(row.get("id")?),
        kind,
        family,
        name: row.get("name")?,
        parent_id: row.get("parent_id")?,
        owner_id: row.get("owner_id")?,
        room_id: row.get("room_id")?,
        group_id: row.get("group_id")?,
        read_only,
    };
    item.validate().map_err(|err| {
        ItemRepoError::InvalidData(format!("{} row violates item model: {err}", family.table()))
    })?;
    Ok(item)
}

fn ensure_connection_ready(conn: &Connection, table: &'static str) -> ItemRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(ItemRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(ItemRepoError::MissingRequiredTable(table));
    }

    for column in ITEM_COLUMNS.iter().copied() {
        if !table_has_column(conn, table, column)? {
            return Err(ItemRepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> ItemRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> ItemRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
