//! # `when`: wait for a group of tasks or deferreds.

use crate::deferred::Deferred;
use crate::error::ScopeError;
use crate::tasks::Task;

use super::Scope;

/// Inputs accepted by [`Scope::when`].
#[derive(Clone, Debug)]
pub enum When {
    /// Tasks currently matching a selector (resolved at call time).
    Selector(String),
    /// An explicit list of tasks.
    Tasks(Vec<Task>),
    /// Arbitrary deferreds.
    Deferreds(Vec<Deferred<()>>),
}

impl From<&str> for When {
    fn from(value: &str) -> Self {
        When::Selector(value.to_string())
    }
}

impl From<String> for When {
    fn from(value: String) -> Self {
        When::Selector(value)
    }
}

impl From<Vec<Task>> for When {
    fn from(value: Vec<Task>) -> Self {
        When::Tasks(value)
    }
}

impl From<&[Task]> for When {
    fn from(value: &[Task]) -> Self {
        When::Tasks(value.to_vec())
    }
}

impl From<Vec<Deferred<()>>> for When {
    fn from(value: Vec<Deferred<()>>) -> Self {
        When::Deferreds(value)
    }
}

impl From<Vec<Deferred<Task>>> for When {
    /// Scheduling requests, as returned by [`Scope::schedule`].
    fn from(value: Vec<Deferred<Task>>) -> Self {
        When::Deferreds(value.into_iter().map(|d| Deferred::all([d])).collect())
    }
}

impl Scope {
    /// Resolves once every input resolves; rejects with the first rejection.
    ///
    /// An empty input (including a selector matching nothing) resolves immediately.
    ///
    /// # Example
    /// ```
    /// use taskscope::Scope;
    ///
    /// let root = Scope::root();
    /// let a = root.create("sample.a").unwrap();
    /// let b = root.create("sample.b").unwrap();
    ///
    /// let both = root.when("sample.*").unwrap();
    /// a.resolve();
    /// assert!(!both.is_settled());
    /// b.resolve();
    /// assert!(both.is_resolved());
    /// ```
    pub fn when(&self, what: impl Into<When>) -> Result<Deferred<()>, ScopeError> {
        let deferreds: Vec<Deferred<()>> = match what.into() {
            When::Selector(text) => self
                .find(&text)?
                .iter()
                .map(|t| t.deferred().clone())
                .collect(),
            When::Tasks(tasks) => tasks.iter().map(|t| t.deferred().clone()).collect(),
            When::Deferreds(list) => list,
        };
        Ok(Deferred::all(deferreds))
    }
}
