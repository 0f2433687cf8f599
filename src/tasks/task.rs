//! # Task record.
//!
//! A [`Task`] is a plain record (id, types, status, creator, payload) that owns the
//! [`Deferred`] it settles through. Consumers attach continuations to the task
//! directly (`done` / `fail` / `always`) or `await` it.
//!
//! Settlement happens exactly once, whoever triggers it (normal completion,
//! refusal or [`Scope::cancel`](crate::Scope::cancel)). On settlement the task
//! flips to [`TaskStatus::Settled`] and drops its pending admission marker.

use std::fmt;
use std::future::IntoFuture;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::deferred::{Deferred, Outcome};
use crate::error::Rejection;
use crate::scope::ScopeId;

/// Process-unique task identifier.
pub type TaskId = u64;

static TASK_SEQ: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Admission is being evaluated.
    Scheduling,
    /// Waiting on a deferred admission verdict.
    Scheduled,
    /// Created directly or admitted.
    Running,
    /// Resolved or rejected; no longer in the registry.
    Settled,
}

impl TaskStatus {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskStatus::Scheduling => "scheduling",
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::Running => "running",
            TaskStatus::Settled => "settled",
        }
    }
}

struct TaskState {
    status: TaskStatus,
    round: u64,
    pending_admission: Option<Deferred<()>>,
    payload: Map<String, Value>,
}

struct TaskInner {
    id: TaskId,
    full_type: Arc<str>,
    scoped_type: Arc<str>,
    lineage: Arc<[ScopeId]>,
    state: Mutex<TaskState>,
    settled: Deferred<()>,
}

/// Live task handle. Cloning shares the same task.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

/// Non-owning task handle used by settlement hooks.
#[derive(Clone)]
pub(crate) struct WeakTask(Weak<TaskInner>);

impl WeakTask {
    pub(crate) fn upgrade(&self) -> Option<Task> {
        self.0.upgrade().map(|inner| Task { inner })
    }
}

impl Task {
    /// Allocates a running task. `lineage` is the creator followed by its owners.
    pub(crate) fn new(full_type: String, scoped_type: &str, lineage: Arc<[ScopeId]>) -> Self {
        let task = Self {
            inner: Arc::new(TaskInner {
                id: TASK_SEQ.fetch_add(1, Ordering::Relaxed),
                full_type: full_type.into(),
                scoped_type: scoped_type.into(),
                lineage,
                state: Mutex::new(TaskState {
                    status: TaskStatus::Running,
                    round: 0,
                    pending_admission: None,
                    payload: Map::new(),
                }),
                settled: Deferred::new(),
            }),
        };

        let weak = task.downgrade();
        task.inner.settled.on_settle(move |_| {
            if let Some(task) = weak.upgrade() {
                let mut st = task.lock();
                st.status = TaskStatus::Settled;
                st.pending_admission = None;
            }
        });
        task
    }

    /// Process-unique id.
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    /// Fully qualified type (creator scope name + scoped type).
    pub fn full_type(&self) -> &str {
        &self.inner.full_type
    }

    /// Type relative to the creating scope.
    pub fn scoped_type(&self) -> &str {
        &self.inner.scoped_type
    }

    /// Id of the creating scope.
    pub fn creator(&self) -> ScopeId {
        self.inner.lineage[0]
    }

    /// Current status.
    pub fn status(&self) -> TaskStatus {
        self.lock().status
    }

    /// True if `scope` created this task or owns (transitively) its creator.
    pub fn is_owned_by(&self, scope: ScopeId) -> bool {
        self.inner.lineage.contains(&scope)
    }

    /// The deferred this task settles through.
    pub fn deferred(&self) -> &Deferred<()> {
        &self.inner.settled
    }

    /// Completes the task. Returns `false` if it was already settled.
    pub fn resolve(&self) -> bool {
        self.inner.settled.resolve(())
    }

    /// Fails the task. Returns `false` if it was already settled.
    pub fn reject(&self, reason: Rejection) -> bool {
        self.inner.settled.reject(reason)
    }

    /// Runs `f` when the task completes.
    pub fn done<F>(&self, f: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.settled.done(move |_| f());
        self
    }

    /// Runs `f` when the task fails (refused, canceled or rejected).
    pub fn fail<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&Rejection) + Send + 'static,
    {
        self.inner.settled.fail(f);
        self
    }

    /// Runs `f` on settlement either way.
    pub fn always<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&Outcome<()>) + Send + 'static,
    {
        self.inner.settled.on_settle(f);
        self
    }

    /// True once resolved or rejected.
    pub fn is_settled(&self) -> bool {
        self.inner.settled.is_settled()
    }

    /// The rejection reason, if the task failed.
    pub fn rejection(&self) -> Option<Rejection> {
        self.inner.settled.outcome().and_then(Result::err)
    }

    /// Waits for settlement.
    pub async fn wait(&self) -> Outcome<()> {
        self.inner.settled.wait().await
    }

    /// Stores a payload entry, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.lock().payload.insert(key.into(), value)
    }

    /// Reads a payload entry.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().payload.get(key).cloned()
    }

    /// Snapshot of the whole payload.
    pub fn payload(&self) -> Map<String, Value> {
        self.lock().payload.clone()
    }

    /// True if both handles refer to the same task.
    pub fn ptr_eq(&self, other: &Task) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakTask {
        WeakTask(Arc::downgrade(&self.inner))
    }

    /// Moves a live task to `status`; settled tasks stay settled.
    pub(crate) fn set_status(&self, status: TaskStatus) {
        let mut st = self.lock();
        if st.status != TaskStatus::Settled {
            st.status = status;
        }
    }

    /// Starts a scheduling round: status `scheduling`, stale marker cleared.
    ///
    /// Returns the round number that later admission steps must present.
    pub(crate) fn begin_scheduling(&self) -> u64 {
        let mut st = self.lock();
        if st.status != TaskStatus::Settled {
            st.status = TaskStatus::Scheduling;
        }
        st.pending_admission = None;
        st.round += 1;
        st.round
    }

    /// Records the admission verdict the task is waiting on.
    pub(crate) fn await_admission(&self, gate: Deferred<()>) {
        let mut st = self.lock();
        if st.status != TaskStatus::Settled {
            st.status = TaskStatus::Scheduled;
            st.pending_admission = Some(gate);
        }
    }

    /// Clears the admission marker if it is still set for `round`.
    ///
    /// Returns `false` when the task settled (or was rescheduled) meanwhile.
    pub(crate) fn take_admission(&self, round: u64) -> bool {
        let mut st = self.lock();
        if st.round == round && st.pending_admission.is_some() {
            st.pending_admission = None;
            true
        } else {
            false
        }
    }

    /// True while a deferred admission verdict is outstanding.
    pub fn is_awaiting_admission(&self) -> bool {
        self.lock().pending_admission.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, TaskState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl IntoFuture for Task {
    type Output = Outcome<()>;
    type IntoFuture = BoxFuture<'static, Outcome<()>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("full_type", &self.inner.full_type)
            .field("status", &self.status())
            .field("creator", &self.creator())
            .finish()
    }
}
