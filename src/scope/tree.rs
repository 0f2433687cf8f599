//! # Scope record and registry operations.
//!
//! ## Rules
//! - A scope's `full_name` is computed once at construction and never changes.
//! - Every task's `full_type` begins with its creating scope's `full_name`.
//! - `find` scans newest → oldest and returns oldest first.
//! - `cancel` only rejects; registry removal is the settlement hook's job.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::admission::SchedulerRef;
use crate::config::Config;
use crate::error::{Rejection, ScopeError};
use crate::events::{Bus, Event, EventKind};
use crate::naming;
use crate::selector::Selector;
use crate::tasks::{Registry, Task};

use super::capture::{CaptureBook, CaptureGate};

static SCOPE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-unique scope identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u64);

/// State shared by every scope of one tree.
pub(crate) struct Domain {
    pub(crate) registry: Registry,
    pub(crate) bus: Bus,
}

pub(super) struct ScopeInner {
    pub(super) id: ScopeId,
    pub(super) relative_name: String,
    pub(super) full_name: Arc<str>,
    pub(super) owner: Option<Scope>,
    /// This scope followed by its owners up to the root.
    pub(super) lineage: Arc<[ScopeId]>,
    pub(super) domain: Arc<Domain>,
    pub(super) schedulers: Mutex<Vec<SchedulerRef>>,
    pub(super) captures: Arc<CaptureBook>,
    selectors: Mutex<HashMap<String, Arc<Selector>>>,
}

/// Node of the ownership tree. Cloning shares the same node.
#[derive(Clone)]
pub struct Scope {
    pub(super) inner: Arc<ScopeInner>,
}

impl Scope {
    /// Creates a standalone root scope with default [`Config`] and no subscribers.
    ///
    /// Use [`Coordinator::builder`](crate::Coordinator::builder) to attach subscribers.
    ///
    /// # Example
    /// ```
    /// use taskscope::Scope;
    ///
    /// let root = Scope::root();
    /// let a = root.context("a").unwrap();
    /// let ax = a.context("x").unwrap();
    /// assert_eq!(root.full_name(), "");
    /// assert_eq!(ax.full_name(), "a.x");
    /// ```
    pub fn root() -> Self {
        Self::root_with(Bus::new(Config::default().bus_capacity_clamped()))
    }

    pub(crate) fn root_with(bus: Bus) -> Self {
        let domain = Arc::new(Domain {
            registry: Registry::new(),
            bus,
        });
        Self::build(String::new(), None, domain)
    }

    fn build(relative_name: String, owner: Option<Scope>, domain: Arc<Domain>) -> Self {
        let id = ScopeId(SCOPE_SEQ.fetch_add(1, Ordering::Relaxed));
        let (full_name, lineage): (Arc<str>, Arc<[ScopeId]>) = match &owner {
            Some(o) => (
                naming::join(o.full_name(), &relative_name).into(),
                std::iter::once(id)
                    .chain(o.inner.lineage.iter().copied())
                    .collect(),
            ),
            None => (relative_name.as_str().into(), Arc::from(vec![id])),
        };

        let captures = Arc::new(CaptureBook::new());
        let gate: SchedulerRef = Arc::new(CaptureGate::new(
            Arc::clone(&full_name),
            Arc::clone(&captures),
            domain.bus.clone(),
        ));

        Self {
            inner: Arc::new(ScopeInner {
                id,
                relative_name,
                full_name,
                owner,
                lineage,
                domain,
                schedulers: Mutex::new(vec![gate]),
                captures,
                selectors: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Forks a child scope sharing this scope's registry.
    ///
    /// `relative_name` must follow the dotted type grammar (`a`, `foo.bar.har`, ...).
    pub fn context(&self, relative_name: &str) -> Result<Scope, ScopeError> {
        if !naming::is_valid_type(relative_name) {
            return Err(ScopeError::InvalidScope {
                value: relative_name.to_string(),
            });
        }

        let child = Self::build(
            relative_name.to_string(),
            Some(self.clone()),
            Arc::clone(&self.inner.domain),
        );
        self.bus()
            .publish_with(|| Event::new(EventKind::ScopeCreated).with_scope(child.full_name()));
        Ok(child)
    }

    /// Creates a running task of `scoped_type` and registers it.
    ///
    /// The task leaves the registry exactly once, when it settles (resolve or reject).
    pub fn create(&self, scoped_type: &str) -> Result<Task, ScopeError> {
        let full_type = naming::join(self.full_name(), scoped_type);
        if scoped_type.is_empty() || !naming::is_valid_type(&full_type) {
            return Err(ScopeError::InvalidType {
                value: scoped_type.to_string(),
            });
        }

        let task = Task::new(full_type, scoped_type, Arc::clone(&self.inner.lineage));
        self.inner.domain.registry.push(task.clone());

        let weak_task = task.downgrade();
        let domain: Weak<Domain> = Arc::downgrade(&self.inner.domain);
        task.always(move |outcome| {
            let (Some(task), Some(domain)) = (weak_task.upgrade(), domain.upgrade()) else {
                return;
            };
            domain.registry.forget(&task);
            domain.bus.publish_with(|| match outcome {
                Ok(()) => Event::new(EventKind::TaskResolved).for_task(&task),
                Err(reason) => Event::new(EventKind::TaskRejected)
                    .for_task(&task)
                    .with_reason(reason.to_string()),
            });
        });

        self.bus().publish_with(|| {
            Event::new(EventKind::TaskCreated)
                .with_scope(self.full_name())
                .for_task(&task)
        });
        Ok(task)
    }

    /// Live tasks matching `selector`, oldest first.
    ///
    /// # Example
    /// ```
    /// use taskscope::Scope;
    ///
    /// let root = Scope::root();
    /// let c1 = root.context("foo.bar.common").unwrap();
    /// let c2 = root.context("foo.bar.common").unwrap();
    /// c1.create("test").unwrap();
    /// c2.create("test").unwrap();
    /// c2.create("test").unwrap();
    ///
    /// assert_eq!(c2.find("test").unwrap().len(), 2);
    /// assert_eq!(c2.find("test [all]").unwrap().len(), 3);
    /// assert_eq!(c2.find("test [others]").unwrap().len(), 1);
    /// assert_eq!(root.find("foo.*").unwrap().len(), 3);
    /// ```
    pub fn find(&self, selector: &str) -> Result<Vec<Task>, ScopeError> {
        let selector = self.selector(selector)?;
        let viewer = self.id();
        Ok(self
            .inner
            .domain
            .registry
            .select(|t| selector.matches(t, viewer)))
    }

    /// Rejects every task matching `selector` with [`Rejection::Canceled`].
    ///
    /// Returns how many tasks this call settled.
    pub fn cancel(&self, selector: &str) -> Result<usize, ScopeError> {
        let tasks = self.find(selector)?;
        Ok(tasks
            .iter()
            .filter(|t| t.reject(Rejection::Canceled))
            .count())
    }

    /// Removes `task` from the shared registry (no-op if absent).
    pub fn forget(&self, task: &Task) -> bool {
        self.inner.domain.registry.forget(task)
    }

    /// Moves `task` to the tail of the shared registry (inserting it if absent).
    pub fn remember(&self, task: &Task) {
        self.inner.domain.registry.remember(task.clone());
    }

    /// Snapshot of the shared registry in insertion order.
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.domain.registry.snapshot()
    }

    /// Number of live tasks in the whole tree.
    pub fn task_count(&self) -> usize {
        self.inner.domain.registry.len()
    }

    /// True when no task is live anywhere in the tree.
    pub fn is_idle(&self) -> bool {
        self.inner.domain.registry.is_empty()
    }

    /// Compiled selector for `text`, cached per scope.
    pub(crate) fn selector(&self, text: &str) -> Result<Arc<Selector>, ScopeError> {
        if let Some(sel) = self.selectors().get(text) {
            return Ok(Arc::clone(sel));
        }
        let compiled = Arc::new(Selector::compile(text, self.full_name())?);
        self.selectors()
            .insert(text.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Process-unique id.
    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    /// Name relative to the owner (`""` for the root).
    pub fn relative_name(&self) -> &str {
        &self.inner.relative_name
    }

    /// Owner-qualified name (`""` for the root).
    pub fn full_name(&self) -> &str {
        &self.inner.full_name
    }

    /// The owning scope, `None` for the root.
    pub fn owner(&self) -> Option<&Scope> {
        self.inner.owner.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.inner.owner.is_none()
    }

    /// True if `other` is this scope or one of its owners.
    pub fn is_within(&self, other: &Scope) -> bool {
        self.inner.lineage.contains(&other.id())
    }

    /// True if both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.inner.domain.bus
    }

    fn selectors(&self) -> MutexGuard<'_, HashMap<String, Arc<Selector>>> {
        self.inner
            .selectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("full_name", &self.inner.full_name)
            .finish()
    }
}
