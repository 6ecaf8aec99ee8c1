//! Task list controller.
//!
//! # Responsibility
//! - Own the canonical in-memory task list.
//! - Mirror every mutation into the task store.
//! - Notify subscribers whenever the list changes.
//!
//! # Invariants
//! - Mutations never run against an unloaded list; the first mutation loads.
//! - Insertion order is display order; removal keeps survivors in place.
//! - Storage faults never reach callers.

use crate::config::{TaskListConfig, DEFAULT_TASK_LABEL};
use crate::model::task::{Task, TaskKey};
use crate::repo::kv_store::KeyValueStore;
use crate::store::task_store::TaskStore;
use log::{debug, info};
use std::collections::BTreeMap;

/// Lifecycle of the controller's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// Process started; storage not read yet.
    Uninitialized,
    /// List loaded (or initialized empty) and accepting mutations.
    Ready,
}

/// Handle returned by [`TaskListController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[Task]) + Send>;

/// Owns the task list and persists it after each change.
pub struct TaskListController<S: KeyValueStore> {
    store: TaskStore<S>,
    config: TaskListConfig,
    state: ListState,
    tasks: Vec<Task>,
    revision: u64,
    listeners: BTreeMap<SubscriptionId, Listener>,
    next_subscription: u64,
}

impl<S: KeyValueStore> TaskListController<S> {
    /// Creates an uninitialized controller over `storage`.
    pub fn new(storage: S, config: TaskListConfig) -> Self {
        let store = TaskStore::new(storage, config.storage_key.clone());
        Self {
            store,
            config,
            state: ListState::Uninitialized,
            tasks: Vec::new(),
            revision: 0,
            listeners: BTreeMap::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ListState::Ready
    }

    pub fn config(&self) -> &TaskListConfig {
        &self.config
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Current list snapshot in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Reads the stored list and enters `Ready`.
    ///
    /// # Contract
    /// - Non-empty stored list: adopted as-is.
    /// - Absent, unreadable or empty stored list: memory becomes empty and an
    ///   empty list is written back.
    /// - Calling again while `Ready` re-reads storage.
    pub fn load(&mut self) -> &[Task] {
        match self.store.load() {
            Some(tasks) if !tasks.is_empty() => {
                self.tasks = tasks;
            }
            _ => {
                self.tasks = Vec::new();
                self.persist();
            }
        }
        self.state = ListState::Ready;
        info!(
            "event=task_list_load module=service status=ok count={}",
            self.tasks.len()
        );
        self.notify();
        &self.tasks
    }

    /// Appends a task with a fresh key and persists the list.
    pub fn add(&mut self, label: impl Into<String>) -> &[Task] {
        self.ensure_ready();
        let task = Task::new(label, self.config.new_task_completed);
        debug!(
            "event=task_add module=service key={} completed={}",
            task.key, task.completed
        );
        self.tasks.push(task);
        self.persist();
        self.notify();
        &self.tasks
    }

    /// Appends a task labelled [`DEFAULT_TASK_LABEL`].
    pub fn add_placeholder(&mut self) -> &[Task] {
        self.add(DEFAULT_TASK_LABEL)
    }

    /// Drops the task with `key`. Persists even when nothing matched.
    pub fn remove(&mut self, key: &TaskKey) -> &[Task] {
        self.ensure_ready();
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.key != key);
        debug!(
            "event=task_remove module=service key={} removed={}",
            key,
            before - self.tasks.len()
        );
        self.persist();
        self.notify();
        &self.tasks
    }

    /// Flips `completed` on the task with `key`; unknown keys leave the list unchanged.
    ///
    /// Persists only when `persist_on_toggle` is set.
    pub fn toggle(&mut self, key: &TaskKey) -> &[Task] {
        self.ensure_ready();
        let found = match self.tasks.iter_mut().find(|task| &task.key == key) {
            Some(task) => {
                task.toggle();
                true
            }
            None => false,
        };
        debug!("event=task_toggle module=service key={key} found={found}");
        if self.config.persist_on_toggle {
            self.persist();
        }
        self.notify();
        &self.tasks
    }

    /// Registers a listener called with the new list after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Task]) + Send + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn ensure_ready(&mut self) {
        if self.state == ListState::Uninitialized {
            self.load();
        }
    }

    fn persist(&mut self) {
        self.revision += 1;
        self.store.save(&self.tasks, self.revision);
    }

    fn notify(&mut self) {
        for listener in self.listeners.values_mut() {
            listener(&self.tasks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListState, TaskListController};
    use crate::config::TaskListConfig;
    use crate::model::task::TaskKey;
    use crate::repo::kv_store::{KeyValueStore, MemoryKeyValueStore};
    use std::sync::{Arc, Mutex};

    fn controller() -> TaskListController<MemoryKeyValueStore> {
        TaskListController::new(MemoryKeyValueStore::new(), TaskListConfig::default())
    }

    #[test]
    fn starts_uninitialized_and_first_mutation_loads() {
        let mut controller = controller();
        assert_eq!(controller.state(), ListState::Uninitialized);

        controller.add("first");
        assert_eq!(controller.state(), ListState::Ready);
        assert_eq!(controller.tasks().len(), 1);
    }

    #[test]
    fn remove_missing_key_still_writes_identical_list() {
        let mut controller = controller();
        controller.load();
        controller.add("keep");
        let revision = controller.store().last_applied_revision();

        let snapshot = controller.tasks().to_vec();
        controller.remove(&TaskKey::new("missing"));
        assert_eq!(controller.tasks(), snapshot.as_slice());
        assert_eq!(controller.store().last_applied_revision(), revision + 1);
    }

    #[test]
    fn toggle_persistence_follows_config() {
        let mut persisting = controller();
        persisting.load();
        let key = persisting.add("a")[0].key.clone();
        persisting.toggle(&key);
        let stored = persisting.store().load().unwrap();
        assert!(stored[0].completed);

        let mut observed =
            TaskListController::new(MemoryKeyValueStore::new(), TaskListConfig::observed());
        observed.load();
        let key = observed.add("a")[0].key.clone();
        assert!(observed.tasks()[0].completed);
        observed.toggle(&key);
        assert!(!observed.tasks()[0].completed);
        let stored = observed.store().load().unwrap();
        assert!(stored[0].completed);
    }

    #[test]
    fn add_before_load_appends_to_stored_list() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .set_item(
                "taskdata",
                r#"[{"key":"k1","task":"saved","completed":false}]"#,
            )
            .unwrap();
        let mut controller = TaskListController::new(backend, TaskListConfig::default());
        assert_eq!(controller.state(), ListState::Uninitialized);

        controller.add("new");

        let stored = controller.store().load().unwrap();
        let labels: Vec<&str> = stored.iter().map(|task| task.label.as_str()).collect();
        assert_eq!(labels, vec!["saved", "new"]);
        assert_eq!(stored[0].key, TaskKey::new("k1"));
        assert_eq!(controller.tasks(), stored.as_slice());
    }

    #[test]
    fn listeners_see_every_change_until_unsubscribed() {
        let seen: Arc<Mutex<Vec<Vec<bool>>>> = Arc::new(Mutex::new(Vec::new()));
        let mut controller = controller();
        let sink = Arc::clone(&seen);
        let id = controller.subscribe(move |tasks| {
            let flags = tasks.iter().map(|task| task.completed).collect();
            sink.lock().unwrap().push(flags);
        });

        controller.load();
        let key = controller.add("a")[0].key.clone();
        controller.add("b");
        controller.toggle(&key);
        controller.toggle(&TaskKey::new("missing"));
        controller.remove(&TaskKey::new("missing"));
        controller.remove(&key);
        assert!(controller.unsubscribe(id));
        assert!(!controller.unsubscribe(id));
        controller.add("c");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                vec![],
                vec![false],
                vec![false, false],
                vec![true, false],
                vec![true, false],
                vec![true, false],
                vec![false],
            ]
        );
    }

    #[test]
    fn stored_value_uses_configured_key() {
        let mut controller = TaskListController::new(
            MemoryKeyValueStore::new(),
            TaskListConfig::new("other"),
        );
        assert_eq!(controller.config().storage_key, "other");
        assert_eq!(controller.store().storage_key(), "other");
        controller.load();
        let backend = controller.store().storage();
        assert_eq!(backend.get_item("other").unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.get_item("taskdata").unwrap(), None);
    }
}
