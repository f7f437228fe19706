//! CLI entry point for the file tree core.
//!
//! # Responsibility
//! - Provide a small executable to verify `filetree_core` linkage.
//! - List tree levels and move items inside an existing database.
//!
//! # Usage
//! - `filetree_cli ping | version`
//! - `filetree_cli ls <db> <files|recordings> [parent_id]`
//! - `filetree_cli mv <db> <files|recordings> <target_id> <item_id>...`
//!
//! Logging is enabled when `FILETREE_LOG_DIR` is set; `FILETREE_LOG_LEVEL`
//! overrides the build-mode default.

use filetree_core::db::open_db;
use filetree_core::{
    default_log_level, init_logging, FamilyStore, FolderService, Item, ItemFamily, ItemId,
    ItemRepository, ItemStore, SelectionTree, SqliteItemRepository,
};
use log::error;
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage:
  filetree_cli ping
  filetree_cli version
  filetree_cli ls <db> <files|recordings> [parent_id]
  filetree_cli mv <db> <files|recordings> <target_id> <item_id>...";

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    if let Err(err) = configure_logging() {
        eprintln!("logging disabled: {err}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn configure_logging() -> Result<(), String> {
    let Ok(log_dir) = std::env::var("FILETREE_LOG_DIR") else {
        return Ok(());
    };
    let level =
        std::env::var("FILETREE_LOG_LEVEL").unwrap_or_else(|_| default_log_level().to_string());
    init_logging(&level, &log_dir)
}

fn run(args: &[String]) -> CliResult<()> {
    match args.first().map(String::as_str) {
        Some("ping") => {
            println!("filetree_core ping={}", filetree_core::ping());
            Ok(())
        }
        Some("version") => {
            println!("filetree_core version={}", filetree_core::core_version());
            Ok(())
        }
        Some("ls") if args.len() == 3 || args.len() == 4 => {
            let family = parse_family(&args[2])?;
            let parent_id = args.get(3).map(|value| parse_id(value)).transpose()?;
            list(&args[1], family, parent_id)
        }
        Some("mv") if args.len() >= 5 => {
            let family = parse_family(&args[2])?;
            let target_id = parse_id(&args[3])?;
            let item_ids = args[4..]
                .iter()
                .map(|value| parse_id(value))
                .collect::<CliResult<Vec<_>>>()?;
            move_items(&args[1], family, target_id, &item_ids)
        }
        _ => Err(USAGE.into()),
    }
}

fn list(db: &str, family: ItemFamily, parent_id: Option<ItemId>) -> CliResult<()> {
    let conn = open_db(db)?;
    let repo = SqliteItemRepository::try_new(&conn, family)?;
    for item in repo.list_children(parent_id)? {
        print_item(&item);
    }
    Ok(())
}

fn move_items(
    db: &str,
    family: ItemFamily,
    target_id: ItemId,
    item_ids: &[ItemId],
) -> CliResult<()> {
    let conn = open_db(db)?;
    let service = FolderService::new(FamilyStore::new(
        SqliteItemRepository::files(&conn)?,
        SqliteItemRepository::recordings(&conn)?,
    ));
    let target = load_required(service.store(), family, target_id)?;
    if !target.is_folder() {
        return Err(format!("{family} item {target_id} is not a folder").into());
    }

    let mut tree = SelectionTree::new(false);
    let mut items = item_ids
        .iter()
        .map(|id| load_required(service.store(), family, *id))
        .collect::<CliResult<Vec<_>>>()?;
    if items.len() > 1 {
        for item in &items {
            tree.select(item);
        }
    }

    let Some(dragged) = items.first_mut() else {
        return Err(USAGE.into());
    };
    let summary = service.handle_drop(&mut tree, &target, dragged)?;
    for item in &summary.moved {
        print_item(item);
    }
    println!("moved={} skipped={}", summary.moved.len(), summary.skipped);
    Ok(())
}

fn load_required(store: &impl ItemStore, family: ItemFamily, id: ItemId) -> CliResult<Item> {
    store
        .load(family, id)?
        .ok_or_else(|| format!("{family} item {id} not found").into())
}

fn print_item(item: &Item) {
    println!(
        "{}\t{}\tparent={}\towner={}\troom={}\tgroup={}\t{}{}",
        format_id(item.id),
        item.kind.as_str(),
        format_id(item.parent_id),
        format_id(item.owner_id),
        format_id(item.room_id),
        format_id(item.group_id),
        item.name,
        if item.read_only { "\t(read-only)" } else { "" }
    );
}

fn parse_family(value: &str) -> CliResult<ItemFamily> {
    match value {
        "files" => Ok(ItemFamily::File),
        "recordings" => Ok(ItemFamily::Recording),
        other => Err(format!("unknown tree `{other}`; expected files|recordings").into()),
    }
}

fn parse_id(value: &str) -> CliResult<ItemId> {
    value
        .parse()
        .map_err(|err| format!("invalid id `{value}`: {err}").into())
}

fn format_id(id: Option<i64>) -> String {
    id.map_or_else(|| "-".to_string(), |value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse_family, parse_id, run};
    use filetree_core::db::open_db;
    use filetree_core::{Item, ItemFamily, ItemRepository, SqliteItemRepository};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_family_accepts_both_trees() {
        assert_eq!(parse_family("files").unwrap(), ItemFamily::File);
        assert_eq!(parse_family("recordings").unwrap(), ItemFamily::Recording);
        let err = parse_family("photos").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown tree `photos`; expected files|recordings"
        );
    }

    #[test]
    fn parse_id_rejects_non_numeric_values() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("4x")
            .unwrap_err()
            .to_string()
            .starts_with("invalid id `4x`"));
    }

    #[test]
    fn incomplete_commands_print_usage() {
        let commands: [&[&str]; 4] = [&["mv", "tree.db", "files", "1"], &["ls"], &["rm", "x"], &[]];
        for command in commands {
            let err = run(&args(command)).unwrap_err();
            assert!(err.to_string().starts_with("usage:"), "{command:?}");
        }
    }

    #[test]
    fn mv_moves_every_listed_item_into_target() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("tree.db");
        let db = db.to_str().unwrap();
        let conn = open_db(db).unwrap();
        let files = SqliteItemRepository::files(&conn).unwrap();
        let folder = files
            .create_item(&Item::folder(ItemFamily::File, "Docs").with_owner(Some(3)))
            .unwrap();
        let a = files.create_item(&Item::file("a.pdf")).unwrap();
        let b = files.create_item(&Item::file("b.pdf")).unwrap();

        let folder_id = folder.id.unwrap().to_string();
        let a_id = a.id.unwrap().to_string();
        let b_id = b.id.unwrap().to_string();
        run(&args(&["mv", db, "files", &folder_id, &a_id, &b_id])).unwrap();

        let children = files.list_children(folder.id).unwrap();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|item| item.owner_id == Some(3)));
        run(&args(&["ls", db, "files", &folder_id])).unwrap();
    }

    #[test]
    fn mv_refuses_non_folder_target_and_missing_items() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("tree.db");
        let db = db.to_str().unwrap();
        let conn = open_db(db).unwrap();
        let recordings = SqliteItemRepository::recordings(&conn).unwrap();
        let clip = recordings.create_item(&Item::recording("kickoff")).unwrap();
        let other = recordings.create_item(&Item::recording("retro")).unwrap();

        let clip_id = clip.id.unwrap().to_string();
        let other_id = other.id.unwrap().to_string();
        let err = run(&args(&["mv", db, "recordings", &clip_id, &other_id])).unwrap_err();
        assert_eq!(err.to_string(), format!("recording item {clip_id} is not a folder"));

        let err = run(&args(&["mv", db, "recordings", "99", &other_id])).unwrap_err();
        assert_eq!(err.to_string(), "recording item 99 not found");
        assert_eq!(recordings.get_item(other.id.unwrap()).unwrap().unwrap(), other);
    }
}
