//! # Admission chain and scheduling.
//!
//! [`Scope::allowed`] asks the scope's own schedulers (capture gate first, then the
//! registered ones in order), then the owner with the type re-scoped by this scope's
//! relative name, up to the root.
//!
//! ## Verdict folding
//! ```text
//! local schedulers ──► Refuse? ──yes──► Refuse (stop, slower voters are not awaited)
//!        │ Defer → collect
//!        ▼
//! owner.allowed(rel.type) ──► Refuse? ──yes──► Refuse
//!        │ Defer → collect
//!        ▼
//! collected.is_empty() ? Accept : Defer(all(collected))
//! ```
//!
//! ## Scheduling states
//! ```text
//! scheduling ──Accept──► running
//!     │ ──Refuse──► settled (task and request rejected with the same reason)
//!     └──Defer───► scheduled ──gate ok, still pending──► running
//!                       │ ──gate ok, canceled meanwhile──► request rejected
//!                       └──gate err──► settled (if still pending) + request rejected
//! ```

use crate::admission::{SchedulerRef, Verdict};
use crate::deferred::Deferred;
use crate::error::{Rejection, ScopeError};
use crate::events::{Bus, Event, EventKind};
use crate::naming;
use crate::tasks::{Task, TaskStatus};

use super::Scope;

/// What [`Scope::schedule`] accepts: a scoped type to create, or an existing task.
#[derive(Clone, Debug)]
pub enum Schedulable {
    /// Scoped type; a new task is created in the scheduling scope.
    Type(String),
    /// Already created task (re-admission).
    Task(Task),
}

impl From<&str> for Schedulable {
    fn from(value: &str) -> Self {
        Schedulable::Type(value.to_string())
    }
}

impl From<String> for Schedulable {
    fn from(value: String) -> Self {
        Schedulable::Type(value)
    }
}

impl From<Task> for Schedulable {
    fn from(value: Task) -> Self {
        Schedulable::Task(value)
    }
}

impl From<&Task> for Schedulable {
    fn from(value: &Task) -> Self {
        Schedulable::Task(value.clone())
    }
}

impl Scope {
    /// Appends an admission predicate after the ones already registered.
    pub fn add_scheduler(&self, scheduler: SchedulerRef) -> &Self {
        let name = scheduler.name().to_string();
        self.inner
            .schedulers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(scheduler);
        self.bus().publish_with(|| {
            Event::new(EventKind::SchedulerAdded)
                .with_scope(self.full_name())
                .with_reason(name)
        });
        self
    }

    /// Renders the admission verdict of this scope chain for `scoped_type`.
    pub fn allowed(&self, scoped_type: &str) -> Verdict {
        let mut pending = Vec::new();
        if let Some(refusal) = self.fold_local(scoped_type, &mut pending) {
            return refusal;
        }

        if let Some(owner) = self.owner() {
            let rescoped = naming::join(self.relative_name(), scoped_type);
            match owner.allowed(&rescoped) {
                Verdict::Accept => {}
                Verdict::Defer(d) => pending.push(d),
                refusal @ Verdict::Refuse(_) => return refusal,
            }
        }

        if pending.is_empty() {
            Verdict::Accept
        } else {
            Verdict::Defer(Deferred::all(pending))
        }
    }

    /// Evaluates local schedulers; returns the first refusal, collecting deferrals.
    fn fold_local(&self, scoped_type: &str, pending: &mut Vec<Deferred<()>>) -> Option<Verdict> {
        // Snapshot: a scheduler may register another scheduler while judging.
        let schedulers: Vec<SchedulerRef> = self
            .inner
            .schedulers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        for scheduler in schedulers {
            match scheduler.admit(scoped_type) {
                Verdict::Accept => {}
                Verdict::Defer(d) => pending.push(d),
                refusal @ Verdict::Refuse(_) => return Some(refusal),
            }
        }
        None
    }

    /// Schedules a new task of a scoped type, or re-admits an existing task.
    ///
    /// The returned deferred resolves with the task once every admission level
    /// agrees, and rejects when any level refuses or the task settles first.
    /// A refusal rejects the task too, so it is observable through either handle.
    ///
    /// # Example
    /// ```
    /// use taskscope::{Scope, TaskStatus};
    ///
    /// let root = Scope::root();
    /// root.capture("*.delayed").unwrap();
    ///
    /// let now = root.schedule("job").unwrap();
    /// let later = root.schedule("job.delayed").unwrap();
    /// assert!(now.is_resolved());
    /// assert!(!later.is_settled());
    /// assert_eq!(root.find("* [scheduled]").unwrap().len(), 1);
    ///
    /// root.release("*.delayed").unwrap();
    /// let task = later.outcome().unwrap().unwrap();
    /// assert_eq!(task.status(), TaskStatus::Running);
    /// ```
    pub fn schedule(&self, what: impl Into<Schedulable>) -> Result<Deferred<Task>, ScopeError> {
        let task = match what.into() {
            Schedulable::Type(scoped) => self.create(&scoped)?,
            Schedulable::Task(task) => task,
        };

        let scheduling: Deferred<Task> = Deferred::new();
        let round = task.begin_scheduling();
        self.bus().publish_with(|| {
            Event::new(EventKind::TaskScheduled)
                .with_scope(self.full_name())
                .for_task(&task)
        });

        match self.allowed(task.scoped_type()) {
            // Settled before or during `allowed` (rescheduled or canceled by a scheduler).
            Verdict::Accept if task.is_settled() => {
                scheduling.reject(task.rejection().unwrap_or(Rejection::Settled));
            }
            Verdict::Accept => {
                task.set_status(TaskStatus::Running);
                admitted(self.bus(), self.full_name(), &task);
                scheduling.resolve(task);
            }
            Verdict::Refuse(reason) => {
                refused(self.bus(), self.full_name(), &task, &reason);
                task.reject(reason.clone());
                scheduling.reject(reason);
            }
            Verdict::Defer(gate) => {
                task.await_admission(gate.clone());
                self.bus().publish_with(|| {
                    Event::new(EventKind::TaskDeferred)
                        .with_scope(self.full_name())
                        .for_task(&task)
                });
                self.await_gate(gate, &task, round, scheduling.clone());
            }
        }
        Ok(scheduling)
    }

    /// Promotes or fails `task` once the deferred verdict settles.
    fn await_gate(&self, gate: Deferred<()>, task: &Task, round: u64, scheduling: Deferred<Task>) {
        let weak = task.downgrade();
        let bus = self.bus().clone();
        let scope_name: std::sync::Arc<str> = self.full_name().into();

        gate.on_settle(move |outcome| {
            let Some(task) = weak.upgrade() else {
                scheduling.reject(Rejection::Settled);
                return;
            };
            match outcome {
                Ok(()) if task.take_admission(round) => {
                    task.set_status(TaskStatus::Running);
                    admitted(&bus, &scope_name, &task);
                    scheduling.resolve(task);
                }
                Ok(()) => {
                    scheduling.reject(task.rejection().unwrap_or(Rejection::Settled));
                }
                Err(reason) => {
                    if task.take_admission(round) {
                        refused(&bus, &scope_name, &task, reason);
                        task.reject(reason.clone());
                    }
                    scheduling.reject(reason.clone());
                }
            }
        });
    }
}

fn admitted(bus: &Bus, scope: &str, task: &Task) {
    bus.publish_with(|| {
        Event::new(EventKind::TaskAdmitted)
            .with_scope(scope)
            .for_task(task)
    });
}

fn refused(bus: &Bus, scope: &str, task: &Task, reason: &Rejection) {
    bus.publish_with(|| {
        Event::new(EventKind::TaskRefused)
            .with_scope(scope)
            .for_task(task)
            .with_reason(reason.to_string())
    });
}
