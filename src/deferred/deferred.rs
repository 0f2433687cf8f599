//! # Deferred: the settle-once cell behind tasks and scheduling requests.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use taskscope::{Deferred, Rejection};
//!
//! let d: Deferred<u32> = Deferred::new();
//! let seen = Arc::new(Mutex::new(None));
//! let s = seen.clone();
//! d.done(move |v| *s.lock().unwrap() = Some(*v));
//!
//! assert!(d.resolve(7));
//! assert!(!d.reject(Rejection::Canceled)); // already settled
//! assert_eq!(*seen.lock().unwrap(), Some(7));
//! ```

use std::fmt;
use std::future::IntoFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::Notify;

use crate::error::Rejection;

/// Final state of a [`Deferred`].
pub type Outcome<T> = Result<T, Rejection>;

type Continuation<T> = Box<dyn FnOnce(&Outcome<T>) + Send + 'static>;

struct State<T> {
    outcome: Option<Outcome<T>>,
    continuations: Vec<Continuation<T>>,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    notify: Notify,
}

struct WakeOnDrop<'a>(&'a Notify);

impl Drop for WakeOnDrop<'_> {
    fn drop(&mut self) {
        self.0.notify_waiters();
    }
}

/// Shared handle to a value that settles exactly once.
///
/// Cloning is cheap and every clone observes the same settlement.
pub struct Deferred<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Deferred<T> {
    /// Creates a pending deferred.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    outcome: None,
                    continuations: Vec::new(),
                }),
                notify: Notify::new(),
            }),
        }
    }

    /// Creates an already resolved deferred.
    pub fn resolved(value: T) -> Self {
        let d = Self::new();
        d.resolve(value);
        d
    }

    /// Creates an already rejected deferred.
    pub fn rejected(reason: Rejection) -> Self {
        let d = Self::new();
        d.reject(reason);
        d
    }

    /// Resolves with `value`. Returns `false` if it was already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects with `reason`. Returns `false` if it was already settled.
    pub fn reject(&self, reason: Rejection) -> bool {
        self.settle(Err(reason))
    }

    fn settle(&self, outcome: Outcome<T>) -> bool {
        let continuations = {
            let mut st = self.lock();
            if st.outcome.is_some() {
                return false;
            }
            st.outcome = Some(outcome.clone());
            std::mem::take(&mut st.continuations)
        };

        // Waiters are woken even if a continuation panics.
        let _wake = WakeOnDrop(&self.inner.notify);
        for continuation in continuations {
            continuation(&outcome);
        }
        true
    }

    /// Attaches a continuation that runs on settlement (either way).
    ///
    /// Runs immediately if the deferred is already settled.
    pub fn on_settle<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        let mut st = self.lock();
        match st.outcome.clone() {
            Some(outcome) => {
                drop(st);
                f(&outcome);
            }
            None => st.continuations.push(Box::new(f)),
        }
        self
    }

    /// Attaches a continuation that runs only on resolution.
    pub fn done<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.on_settle(move |outcome| {
            if let Ok(value) = outcome {
                f(value);
            }
        })
    }

    /// Attaches a continuation that runs only on rejection.
    pub fn fail<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&Rejection) + Send + 'static,
    {
        self.on_settle(move |outcome| {
            if let Err(reason) = outcome {
                f(reason);
            }
        })
    }

    /// Returns the outcome if settled.
    pub fn outcome(&self) -> Option<Outcome<T>> {
        self.lock().outcome.clone()
    }

    /// True once resolved or rejected.
    pub fn is_settled(&self) -> bool {
        self.lock().outcome.is_some()
    }

    /// True if settled successfully.
    pub fn is_resolved(&self) -> bool {
        matches!(self.lock().outcome, Some(Ok(_)))
    }

    /// True if settled with a rejection.
    pub fn is_rejected(&self) -> bool {
        matches!(self.lock().outcome, Some(Err(_)))
    }

    /// Waits for settlement.
    pub async fn wait(&self) -> Outcome<T> {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            notified.await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Deferred<T> {
    /// True if both handles refer to the same deferred.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + Send + 'static> IntoFuture for Deferred<T> {
    type Output = Outcome<T>;
    type IntoFuture = BoxFuture<'static, Outcome<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.lock().outcome {
            None => "pending",
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "rejected",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}
