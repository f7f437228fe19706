//! Tree schema upgrades and link checks.
//!
//! Each step creates one family table. The applied step is recorded in
//! `PRAGMA user_version`, and all pending steps commit together.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::{Connection, OptionalExtension};

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    /// Family table introduced by this step.
    table: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        table: "file_items",
        sql: include_str!("0001_file_items.sql"),
    },
    SchemaStep {
        version: 2,
        table: "recordings",
        sql: include_str!("0002_recordings.sql"),
    },
];

/// Latest schema version this build can write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Family tables present at the latest schema version.
pub fn family_tables() -> impl Iterator<Item = &'static str> {
    SCHEMA_STEPS.iter().map(|step| step.table)
}

/// Creates whichever family tables `conn` is still missing.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file comes from a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = schema_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > current)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    for step in pending {
        info!(
            "event=db_migrate module=db status=applied version={} table={}",
            step.version, step.table
        );
    }
    Ok(())
}

/// Fails on the first item whose `parent_id` names a row that is gone.
///
/// Rows written while foreign keys were off are the only way to get here;
/// a move must never start from such a tree.
pub fn check_parent_links(conn: &Connection) -> DbResult<()> {
    let violation = conn
        .query_row("PRAGMA foreign_key_check;", [], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
        })
        .optional()?;

    let Some((table, rowid)) = violation else {
        return Ok(());
    };
    let item_id = rowid.unwrap_or_default();
    let parent_id = conn
        .query_row(
            &format!("SELECT parent_id FROM {table} WHERE id = ?1;"),
            [item_id],
            |row| row.get::<_, Option<i64>>(0),
        )
        .optional()?
        .flatten();
    warn!(
        "event=db_link_check module=db status=error table={table} item_id={item_id} parent_id={}",
        parent_id.map_or_else(|| "none".to_string(), |value| value.to_string())
    );
    Err(DbError::DanglingParent {
        table,
        item_id,
        parent_id,
    })
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
