//! # LogWriter: renders events through `tracing`
//!
//! A minimal subscriber that turns incoming [`Event`]s into `tracing` records.
//! Install any `tracing` subscriber in the host to see them.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG taskscope: created scope="a.x" task="a.x.job" id=4
//! DEBUG taskscope: deferred scope="a.x" task="a.x.job" id=4
//!  INFO taskscope: gate opened scope="" task="a.x.job"
//!  WARN taskscope: refused scope="a.x" task="a.x.job" id=4 reason="busy"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let scope = e.scope.as_deref().unwrap_or("");
        let task = e.task.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");
        let selector = e.selector.as_deref().unwrap_or("");

        match e.kind {
            EventKind::ScopeCreated => {
                tracing::debug!(target: "taskscope", scope, "scope created");
            }
            EventKind::SchedulerAdded => {
                tracing::debug!(target: "taskscope", scope, scheduler = reason, "scheduler added");
            }
            EventKind::TaskCreated => {
                tracing::debug!(target: "taskscope", scope, task, id = ?e.task_id, "created");
            }
            EventKind::TaskScheduled => {
                tracing::debug!(target: "taskscope", scope, task, id = ?e.task_id, "scheduling");
            }
            EventKind::TaskAdmitted => {
                tracing::debug!(target: "taskscope", scope, task, id = ?e.task_id, "admitted");
            }
            EventKind::TaskDeferred => {
                tracing::debug!(target: "taskscope", scope, task, id = ?e.task_id, "deferred");
            }
            EventKind::TaskRefused => {
                tracing::warn!(target: "taskscope", scope, task, id = ?e.task_id, reason, "refused");
            }
            EventKind::TaskResolved => {
                tracing::debug!(target: "taskscope", task, id = ?e.task_id, "resolved");
            }
            EventKind::TaskRejected => {
                tracing::info!(target: "taskscope", task, id = ?e.task_id, reason, "rejected");
            }
            EventKind::CaptureAdded => {
                tracing::info!(target: "taskscope", scope, selector, "capture added");
            }
            EventKind::CaptureReleased => {
                tracing::info!(target: "taskscope", scope, selector, "capture released");
            }
            EventKind::GateHeld => {
                tracing::debug!(target: "taskscope", scope, task, "gate held");
            }
            EventKind::GateOpened => {
                tracing::info!(target: "taskscope", scope, task, "gate opened");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "taskscope", subscriber = scope, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(target: "taskscope", subscriber = scope, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
