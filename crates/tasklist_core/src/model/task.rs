//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its identifier type.
//! - Provide identity generation and completion helpers.
//!
//! # Invariants
//! - `key` is stable for the lifetime of a task and never reused.
//! - Serialized field names are exactly `key`, `task`, `completed`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one task within the list.
///
/// Serialized as a plain JSON string. Lists written by older builds used
/// millisecond timestamps as keys; those remain valid since the key is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKey(String);

impl TaskKey {
    /// Mints a fresh collision-resistant key (random UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an externally provided key, e.g. one coming back from the UI.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub key: TaskKey,
    /// Free-text label. Serialized as `task` to match the stored layout.
    #[serde(rename = "task")]
    pub label: String,
    pub completed: bool,
}

impl Task {
    /// Creates a task with a freshly generated key.
    pub fn new(label: impl Into<String>, completed: bool) -> Self {
        Self::with_key(TaskKey::generate(), label, completed)
    }

    /// Creates a task with a caller-provided key.
    pub fn with_key(key: TaskKey, label: impl Into<String>, completed: bool) -> Self {
        Self {
            key,
            label: label.into(),
            completed,
        }
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}
