//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list load/add/remove/toggle to Dart via FRB.
//! - Own the process-wide controller bound to the on-device database.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage faults never surface; only controller setup failures do.
//! - Storage calls are exported without `sync`, so Dart awaits them off the UI thread.

use log::{error, warn};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    ping as ping_inner, SqliteKeyValueStore, Task, TaskKey, TaskListConfig, TaskListController,
};

const DB_FILE_NAME: &str = "tasklist.sqlite3";
const DB_PATH_ENV: &str = "TASKLIST_DB_PATH";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CONTROLLER: Mutex<Option<TaskListController<SqliteKeyValueStore>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); blank
///   selects the build default (`debug` or `info`).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match level.trim() {
        "" => default_log_level().as_str(),
        requested => requested,
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row rendered by the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub key: String,
    pub label: String,
    pub completed: bool,
}

/// Response envelope carrying the full list after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// False only when the controller could not be set up.
    pub ok: bool,
    /// Current list in display order.
    pub tasks: Vec<TaskItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl TaskListResponse {
    fn success(tasks: &[Task]) -> Self {
        Self {
            ok: true,
            tasks: tasks.iter().map(to_task_item).collect(),
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            tasks: Vec::new(),
            message: message.into(),
        }
    }
}

/// Loads the stored list (startup event).
///
/// # FFI contract
/// - Absent or unreadable storage yields an empty list that is written back.
pub fn task_list_load() -> TaskListResponse {
    respond("task_list_load", |controller| {
        TaskListResponse::success(controller.load())
    })
}

/// Appends a task; `None` or blank label uses the add-button placeholder.
pub fn task_list_add(label: Option<String>) -> TaskListResponse {
    respond("task_list_add", |controller| {
        match label.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => TaskListResponse::success(controller.add(text)),
            _ => TaskListResponse::success(controller.add_placeholder()),
        }
    })
}

/// Removes the task with `key`; unknown keys leave the list unchanged.
pub fn task_list_remove(key: String) -> TaskListResponse {
    respond("task_list_remove", |controller| {
        TaskListResponse::success(controller.remove(&TaskKey::new(key)))
    })
}

/// Flips the completion flag of the task with `key`.
pub fn task_list_toggle(key: String) -> TaskListResponse {
    respond("task_list_toggle", |controller| {
        TaskListResponse::success(controller.toggle(&TaskKey::new(key)))
    })
}

/// Returns the in-memory list without touching storage.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list_snapshot() -> TaskListResponse {
    let guard = lock_controller("task_list_snapshot");
    match guard.as_ref() {
        Some(controller) => TaskListResponse::success(controller.tasks()),
        None => TaskListResponse::success(&[]),
    }
}

fn respond(
    operation: &str,
    f: impl FnOnce(&mut TaskListController<SqliteKeyValueStore>) -> TaskListResponse,
) -> TaskListResponse {
    let mut guard = lock_controller(operation);

    if guard.is_none() {
        match open_controller() {
            Ok(controller) => *guard = Some(controller),
            Err(err) => {
                error!(
                    "event=ffi_call module=ffi op={operation} status=error error_code=controller_init_failed error={err}"
                );
                return TaskListResponse::failure(format!("{operation} failed: {err}"));
            }
        }
    }

    match guard.as_mut() {
        Some(controller) => f(controller),
        None => TaskListResponse::failure(format!("{operation} failed: controller unavailable")),
    }
}

/// Locks the controller, recovering from a panic in an earlier call.
///
/// A poisoned controller is dropped so the next call reloads from storage.
fn lock_controller(
    operation: &str,
) -> MutexGuard<'static, Option<TaskListController<SqliteKeyValueStore>>> {
    CONTROLLER.lock().unwrap_or_else(|poisoned| {
        warn!("event=ffi_call module=ffi op={operation} status=recovered error_code=lock_poisoned");
        CONTROLLER.clear_poison();
        let mut guard = PoisonError::into_inner(poisoned);
        *guard = None;
        guard
    })
}

fn open_controller() -> Result<TaskListController<SqliteKeyValueStore>, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    let store =
        SqliteKeyValueStore::try_new(conn).map_err(|err| format!("task store init failed: {err}"))?;
    Ok(TaskListController::new(store, TaskListConfig::default()))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        key: task.key.to_string(),
        label: task.label.clone(),
        completed: task.completed,
    }
}
