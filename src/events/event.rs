//! # Engine events emitted by scopes and tasks.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Tree events**: scopes and schedulers being added
//! - **Task lifecycle events**: created, scheduled, admitted, deferred, refused, settled
//! - **Gate events**: captures added/released, requests held and unblocked
//! - **Subscriber events**: overflow and panics in subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, scope,
//! task type, selector and reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use taskscope::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskRefused)
//!     .with_scope("db")
//!     .with_task("db.migrate")
//!     .with_reason("frozen");
//!
//! assert_eq!(ev.kind, EventKind::TaskRefused);
//! assert_eq!(ev.task.as_deref(), Some("db.migrate"));
//! assert_eq!(ev.reason.as_deref(), Some("frozen"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::tasks::{Task, TaskId};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `scope`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `scope`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Tree events ===
    /// A child scope was forked.
    ///
    /// Sets:
    /// - `scope`: full name of the new scope
    ScopeCreated,

    /// A scheduler predicate was registered.
    ///
    /// Sets:
    /// - `scope`: full name of the scope
    /// - `reason`: scheduler name
    SchedulerAdded,

    // === Task lifecycle events ===
    /// Task record allocated and registered.
    ///
    /// Sets:
    /// - `scope`, `task`, `task_id`
    TaskCreated,

    /// Scheduling round started for a task.
    ///
    /// Sets:
    /// - `scope`, `task`, `task_id`
    TaskScheduled,

    /// Admission granted; task is running.
    ///
    /// Sets:
    /// - `scope`, `task`, `task_id`
    TaskAdmitted,

    /// Admission is pending on one or more deferred verdicts.
    ///
    /// Sets:
    /// - `scope`, `task`, `task_id`
    TaskDeferred,

    /// Admission refused (synchronously or by a deferred verdict).
    ///
    /// Sets:
    /// - `scope`, `task`, `task_id`
    /// - `reason`: rejection text
    TaskRefused,

    /// Task settled successfully and left the registry.
    ///
    /// Sets:
    /// - `task`, `task_id`
    TaskResolved,

    /// Task settled with a rejection and left the registry.
    ///
    /// Sets:
    /// - `task`, `task_id`
    /// - `reason`: rejection text (`"canceled"` for cancellation)
    TaskRejected,

    // === Gate events ===
    /// A capture pattern was installed.
    ///
    /// Sets:
    /// - `scope`, `selector`
    CaptureAdded,

    /// Capture patterns were removed by a release.
    ///
    /// Sets:
    /// - `scope`, `selector`
    CaptureReleased,

    /// A scheduling request was held by a capture.
    ///
    /// Sets:
    /// - `scope`: capturing scope
    /// - `task`: held full type
    GateHeld,

    /// A held full type was unblocked.
    ///
    /// Sets:
    /// - `scope`: capturing scope
    /// - `task`: released full type
    GateOpened,
}

/// Engine event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Full name of the scope involved (or subscriber name).
    pub scope: Option<Arc<str>>,
    /// Full task type, if applicable.
    pub task: Option<Arc<str>>,
    /// Task id, if applicable.
    pub task_id: Option<TaskId>,
    /// Selector text, if applicable.
    pub selector: Option<Arc<str>>,
    /// Human-readable reason (refusals, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            scope: None,
            task: None,
            task_id: None,
            selector: None,
            reason: None,
        }
    }

    /// Attaches a scope name.
    #[inline]
    pub fn with_scope(mut self, scope: impl Into<Arc<str>>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Attaches a full task type.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches type and id of a task record.
    #[inline]
    pub fn for_task(mut self, task: &Task) -> Self {
        self.task = Some(task.full_type().into());
        self.task_id = Some(task.id());
        self
    }

    /// Attaches selector text.
    #[inline]
    pub fn with_selector(mut self, selector: impl Into<Arc<str>>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_scope(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_scope(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
