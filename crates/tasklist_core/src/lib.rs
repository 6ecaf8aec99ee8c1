//! Core domain logic for the task list app.
//! This crate is the single source of truth for list and persistence invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{TaskListConfig, DEFAULT_TASK_LABEL, STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::task::{Task, TaskKey};
pub use repo::kv_store::{
    KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore,
};
pub use service::task_list::{ListState, SubscriptionId, TaskListController};
pub use store::task_store::{StoreError, StoreResult, TaskStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
