//! Core use-case services.
//!
//! # Responsibility
//! - Own in-memory task list state and its mutation operations.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod task_list;
