//! # Scheduler predicates.
//!
//! [`Scheduler`] is the extension point for admission rules. [`SchedulerFn`] wraps
//! a closure `Fn(&str) -> Verdict`, which covers most rules.
//!
//! ## Example
//! ```rust
//! use taskscope::{Scope, SchedulerFn, Verdict};
//!
//! let root = Scope::root();
//! let db = root.context("db").unwrap();
//! db.add_scheduler(SchedulerFn::arc("no-migrations", |scoped: &str| {
//!     if scoped.starts_with("migrate") {
//!         Verdict::refuse_with("migrations are frozen")
//!     } else {
//!         Verdict::Accept
//!     }
//! }));
//!
//! assert!(db.allowed("query.users").is_accept());
//! assert!(db.allowed("migrate.v2").is_refuse());
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use super::Verdict;

/// Admission predicate.
///
/// `admit` receives the type **relative to the scope the scheduler is registered
/// on** and must not block. To decide later, return [`Verdict::Defer`].
pub trait Scheduler: Send + Sync + 'static {
    /// Judges one scheduling request.
    fn admit(&self, scoped_type: &str) -> Verdict;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared scheduler handle.
pub type SchedulerRef = Arc<dyn Scheduler>;

/// Closure-backed scheduler.
#[derive(Debug)]
pub struct SchedulerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SchedulerFn<F> {
    /// Creates a new closure-backed scheduler.
    ///
    /// Prefer [`SchedulerFn::arc`] when you immediately need a [`SchedulerRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the scheduler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Scheduler for SchedulerFn<F>
where
    F: Fn(&str) -> Verdict + Send + Sync + 'static,
{
    fn admit(&self, scoped_type: &str) -> Verdict {
        (self.f)(scoped_type)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
