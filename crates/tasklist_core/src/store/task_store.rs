//! Store adapter over a key-value backend.
//!
//! # Responsibility
//! - Serialize the full list and overwrite the stored value on every save.
//! - Load and parse the stored list, reporting absence for any failure.
//!
//! # Invariants
//! - `save`/`load` never return errors; faults are logged and dropped.
//! - A save whose revision is older than the last applied one is discarded.
//!   The controller issues increasing revisions, so this only trips for
//!   callers that drive a `TaskStore` directly with their own revisions.
//! - Stored layout is a bare JSON array of `{key, task, completed}` objects.

use crate::model::task::Task;
use crate::repo::kv_store::{KeyValueStore, KvError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of one store operation.
#[derive(Debug)]
pub enum StoreError {
    Serialize(serde_json::Error),
    Parse(serde_json::Error),
    Storage(KvError),
    /// Revision older than the last applied write.
    Stale { revision: u64, last_applied: u64 },
}

impl StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Serialize(_) => "serialize_failed",
            Self::Parse(_) => "parse_failed",
            Self::Storage(_) => "storage_failed",
            Self::Stale { .. } => "stale_revision",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize task list: {err}"),
            Self::Parse(err) => write!(f, "stored task list is not valid: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Stale {
                revision,
                last_applied,
            } => write!(
                f,
                "save revision {revision} is older than applied revision {last_applied}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) | Self::Parse(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Stale { .. } => None,
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

/// Persists one task list under one storage key.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    storage_key: String,
    last_applied_revision: u64,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(storage: S, storage_key: impl Into<String>) -> Self {
        Self {
            storage,
            storage_key: storage_key.into(),
            last_applied_revision: 0,
        }
    }

    pub fn storage_key(&self) -> &str {
        self.storage_key.as_str()
    }

    /// Returns the backend, e.g. for inspection in diagnostics.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn last_applied_revision(&self) -> u64 {
        self.last_applied_revision
    }

    /// Overwrites the stored list. Failures are logged and ignored.
    pub fn save(&mut self, tasks: &[Task], revision: u64) {
        match self.try_save(tasks, revision) {
            Ok(()) => info!(
                "event=store_save module=store status=ok revision={} count={}",
                revision,
                tasks.len()
            ),
            Err(err @ StoreError::Stale { .. }) => warn!(
                "event=store_save module=store status=skipped error_code={} error={}",
                err.code(),
                err
            ),
            Err(err) => error!(
                "event=store_save module=store status=error revision={} error_code={} error={}",
                revision,
                err.code(),
                err
            ),
        }
    }

    /// Loads the stored list; `None` when absent or unreadable.
    pub fn load(&self) -> Option<Vec<Task>> {
        match self.try_load() {
            Ok(Some(tasks)) => {
                info!(
                    "event=store_load module=store status=ok count={}",
                    tasks.len()
                );
                Some(tasks)
            }
            Ok(None) => {
                info!("event=store_load module=store status=absent");
                None
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code={} error={}",
                    err.code(),
                    err
                );
                None
            }
        }
    }

    /// Removes the stored list. Failures are logged and ignored.
    pub fn clear(&mut self) {
        match self.storage.remove_item(&self.storage_key) {
            Ok(()) => info!("event=store_clear module=store status=ok"),
            Err(err) => error!(
                "event=store_clear module=store status=error error_code=storage_failed error={}",
                err
            ),
        }
    }

    /// Typed variant of [`TaskStore::save`].
    pub fn try_save(&mut self, tasks: &[Task], revision: u64) -> StoreResult<()> {
        if revision < self.last_applied_revision {
            return Err(StoreError::Stale {
                revision,
                last_applied: self.last_applied_revision,
            });
        }

        let encoded = serde_json::to_string(tasks).map_err(StoreError::Serialize)?;
        debug!(
            "event=store_write module=store bytes={} count={}",
            encoded.len(),
            tasks.len()
        );
        self.storage.set_item(&self.storage_key, &encoded)?;
        self.last_applied_revision = revision;
        Ok(())
    }

    /// Typed variant of [`TaskStore::load`].
    pub fn try_load(&self) -> StoreResult<Option<Vec<Task>>> {
        let Some(raw) = self.storage.get_item(&self.storage_key)? else {
            return Ok(None);
        };
        // Empty text reads as absent, same as a missing key.
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let tasks = serde_json::from_str::<Vec<Task>>(&raw).map_err(StoreError::Parse)?;
        Ok(Some(tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreError, TaskStore};
    use crate::model::task::{Task, TaskKey};
    use crate::repo::kv_store::{KeyValueStore, MemoryKeyValueStore};

    fn sample() -> Vec<Task> {
        vec![
            Task::with_key(TaskKey::new("a"), "Buy milk", true),
            Task::with_key(TaskKey::new("b"), "Walk dog", false),
        ]
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let mut store = TaskStore::new(MemoryKeyValueStore::new(), "taskdata");
        store.save(&sample(), 1);
        assert_eq!(store.load(), Some(sample()));
    }

    #[test]
    fn load_reports_absent_for_missing_and_corrupt_values() {
        let mut backend = MemoryKeyValueStore::new();
        let store = TaskStore::new(backend.clone(), "taskdata");
        assert_eq!(store.load(), None);

        backend.set_item("taskdata", "{not json").unwrap();
        let store = TaskStore::new(backend, "taskdata");
        assert!(matches!(store.try_load(), Err(StoreError::Parse(_))));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn stale_revision_is_discarded() {
        let mut store = TaskStore::new(MemoryKeyValueStore::new(), "taskdata");
        store.save(&sample(), 5);
        store.save(&[], 3);

        assert_eq!(store.load(), Some(sample()));
        assert_eq!(store.last_applied_revision(), 5);
        assert!(matches!(
            store.try_save(&[], 4),
            Err(StoreError::Stale {
                revision: 4,
                last_applied: 5
            })
        ));
    }

    #[test]
    fn stored_value_is_a_bare_json_array() {
        let mut store = TaskStore::new(MemoryKeyValueStore::new(), "taskdata");
        store.save(&sample()[..1], 1);
        let raw = store.storage().get_item("taskdata").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"key": "a", "task": "Buy milk", "completed": true}])
        );
    }

    #[test]
    fn clear_removes_stored_value() {
        let mut store = TaskStore::new(MemoryKeyValueStore::new(), "taskdata");
        store.save(&sample(), 1);
        store.clear();
        assert_eq!(store.load(), None);
    }
}
