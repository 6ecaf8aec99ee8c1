//! Key-value persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the storage facility the task store writes through.
//! - Isolate SQLite details from store/controller orchestration.
//!
//! # Invariants
//! - `set_item` fully overwrites any prior value under the same key.
//! - `remove_item` is idempotent.

pub mod kv_store;
