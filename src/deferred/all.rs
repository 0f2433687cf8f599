use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::Deferred;

impl Deferred<()> {
    /// Joins many deferreds into one.
    ///
    /// The result resolves once **every** input resolved (immediately for an empty
    /// input) and rejects with the **first** rejection observed.
    ///
    /// # Example
    /// ```
    /// use taskscope::{Deferred, Rejection};
    ///
    /// let a: Deferred<()> = Deferred::new();
    /// let b: Deferred<()> = Deferred::new();
    /// let both = Deferred::all([a.clone(), b.clone()]);
    ///
    /// a.resolve(());
    /// assert!(!both.is_settled());
    /// b.reject(Rejection::reason("late"));
    /// assert_eq!(both.outcome(), Some(Err(Rejection::reason("late"))));
    /// ```
    pub fn all<T, I>(items: I) -> Deferred<()>
    where
        T: Clone + Send + 'static,
        I: IntoIterator<Item = Deferred<T>>,
    {
        let combined = Deferred::new();
        let items: Vec<Deferred<T>> = items.into_iter().collect();
        if items.is_empty() {
            combined.resolve(());
            return combined;
        }

        let remaining = Arc::new(AtomicUsize::new(items.len()));
        for item in items {
            let combined = combined.clone();
            let remaining = Arc::clone(&remaining);
            item.on_settle(move |outcome| match outcome {
                Ok(_) => {
                    if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                        combined.resolve(());
                    }
                }
                Err(reason) => {
                    combined.reject(reason.clone());
                }
            });
        }
        combined
    }
}
