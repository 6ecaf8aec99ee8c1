//! Task list configuration.
//!
//! # Responsibility
//! - Hold the storage key and the behavior switches of the controller.
//!
//! # Invariants
//! - `storage_key` is never empty once passed through `TaskListConfig::new`.

/// Fixed key under which the whole list is stored.
pub const STORAGE_KEY: &str = "taskdata";

/// Label used by the display layer's add button.
pub const DEFAULT_TASK_LABEL: &str = "New Task";

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListConfig {
    /// Key-value entry holding the JSON-encoded list.
    pub storage_key: String,
    /// Completion flag assigned to newly added tasks.
    pub new_task_completed: bool,
    /// Whether `toggle` writes the updated list to storage.
    pub persist_on_toggle: bool,
}

impl TaskListConfig {
    /// Creates a default configuration with a custom storage key.
    ///
    /// A blank key falls back to [`STORAGE_KEY`].
    pub fn new(storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let storage_key = match storage_key.trim() {
            "" => STORAGE_KEY.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            storage_key,
            ..Self::default()
        }
    }

    /// Behavior shipped by the first mobile release: new tasks start
    /// completed and toggling stays in memory until the next add/remove.
    pub fn observed() -> Self {
        Self {
            new_task_completed: true,
            persist_on_toggle: false,
            ..Self::default()
        }
    }
}

impl Default for TaskListConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            new_task_completed: false,
            persist_on_toggle: true,
        }
    }
}
