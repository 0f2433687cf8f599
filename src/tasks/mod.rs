//! # Task records and the shared registry.
//!
//! This module provides the task-related types:
//! - [`Task`] - metadata record plus the [`Deferred`](crate::Deferred) it settles through
//! - [`TaskStatus`] - `scheduling → scheduled → running → settled`
//! - `Registry` - insertion-ordered list of live tasks shared by a scope tree
//!
//! ## Rules
//! - Exactly one registry entry per live task; it is removed exactly once, on settlement.
//! - `full_type` never changes after creation.

mod registry;
mod task;

pub(crate) use registry::Registry;
pub use task::{Task, TaskId, TaskStatus};
