//! Domain model for the single-user task list.
//!
//! # Responsibility
//! - Define the canonical task record shared by controller, store and FFI.
//! - Keep the serialized shape identical to the persisted JSON layout.
//!
//! # Invariants
//! - Every task is identified by a `TaskKey` unique within its list.
//! - List order is insertion order; removal keeps survivors in place.

pub mod task;
