//! Task list persistence adapter.
//!
//! # Responsibility
//! - Map one fixed storage key to one JSON-encoded task list.
//! - Absorb storage faults so callers never observe them.

pub mod task_store;
