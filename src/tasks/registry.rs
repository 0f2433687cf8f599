//! # Task registry - insertion-ordered list of live tasks.
//!
//! One registry is shared by every scope of a tree. It is assumed to stay short
//! (low-cardinality, short-lived tasks), so it is a plain `Vec` scanned linearly.
//!
//! ## Rules
//! - `push` on creation, `forget` on settlement (driven by the task's own hook)
//! - `forget` of an absent task is a no-op
//! - `remember` moves a task to the tail (re-admission after a deferred verdict)
//! - No user code runs while the lock is held

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Task;

/// Shared registry of live tasks.
#[derive(Default)]
pub(crate) struct Registry {
    tasks: Mutex<Vec<Task>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a task at the tail.
    pub(crate) fn push(&self, task: Task) {
        self.lock().push(task);
    }

    /// Removes `task` if present. Returns `true` if it was there.
    pub(crate) fn forget(&self, task: &Task) -> bool {
        let mut tasks = self.lock();
        match tasks.iter().rposition(|t| t.ptr_eq(task)) {
            Some(idx) => {
                tasks.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Removes `task` if present and re-inserts it at the tail.
    pub(crate) fn remember(&self, task: Task) {
        let mut tasks = self.lock();
        if let Some(idx) = tasks.iter().rposition(|t| t.ptr_eq(&task)) {
            tasks.remove(idx);
        }
        tasks.push(task);
    }

    /// Tasks accepted by `pred`, oldest first.
    ///
    /// Scans newest → oldest and reverses, so ties between tasks of one type
    /// resolve the same way regardless of concurrent appends.
    pub(crate) fn select<F>(&self, pred: F) -> Vec<Task>
    where
        F: Fn(&Task) -> bool,
    {
        let tasks = self.lock();
        let mut found: Vec<Task> = tasks.iter().rev().filter(|t| pred(t)).cloned().collect();
        found.reverse();
        found
    }

    /// Snapshot of every live task in insertion order.
    pub(crate) fn snapshot(&self) -> Vec<Task> {
        self.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
