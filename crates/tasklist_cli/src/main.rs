//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tasklist_core` linkage without the Flutter runtime.
//! - Print the list stored in the database given as the first argument.

use tasklist_core::db::open_db;
use tasklist_core::{SqliteKeyValueStore, TaskListConfig, TaskListController};

fn main() {
    println!("tasklist_core ping={}", tasklist_core::ping());
    println!("tasklist_core version={}", tasklist_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return;
    };
    let store = match open_db(&db_path)
        .map_err(|err| err.to_string())
        .and_then(|conn| SqliteKeyValueStore::try_new(conn).map_err(|err| err.to_string()))
    {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            std::process::exit(1);
        }
    };

    let mut controller = TaskListController::new(store, TaskListConfig::default());
    for task in controller.load() {
        let mark = if task.completed { "x" } else { " " };
        println!("[{mark}] {} ({})", task.label, task.key);
    }
}
