//! # Capture/release gate.
//!
//! Every scope owns a [`CaptureBook`] and registers a [`CaptureGate`] as its first
//! scheduler. While a capture matches a full type, scheduling requests for that
//! type (from this scope or any descendant) wait on one shared gate deferred.
//!
//! ## Rules
//! - Captures are scanned newest first; the first match holds the request.
//! - Gates are keyed by full type only, so overlapping captures share one gate.
//! - `release` opens gates in the order they were first held.
//! - No lock is held while a gate is opened.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::admission::{Scheduler, Verdict};
use crate::deferred::Deferred;
use crate::error::ScopeError;
use crate::events::{Bus, Event, EventKind};
use crate::naming;
use crate::selector::Selector;

use super::Scope;

struct CapturePattern {
    text: String,
    selector: Arc<Selector>,
}

#[derive(Default)]
struct CaptureState {
    captures: Vec<CapturePattern>,
    /// Held full types with their gate, in first-held order.
    pending: Vec<(String, Deferred<()>)>,
}

impl CaptureState {
    fn holds(&self, full_type: &str) -> bool {
        self.captures
            .iter()
            .rev()
            .any(|c| c.selector.matches_type(full_type))
    }
}

/// Captures and held gates of one scope.
#[derive(Default)]
pub(crate) struct CaptureBook {
    state: Mutex<CaptureState>,
}

impl CaptureBook {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Built-in scheduler holding captured types.
pub(crate) struct CaptureGate {
    scope_name: Arc<str>,
    book: Arc<CaptureBook>,
    bus: Bus,
}

impl CaptureGate {
    pub(crate) fn new(scope_name: Arc<str>, book: Arc<CaptureBook>, bus: Bus) -> Self {
        Self {
            scope_name,
            book,
            bus,
        }
    }
}

impl Scheduler for CaptureGate {
    fn admit(&self, scoped_type: &str) -> Verdict {
        let full_type = naming::join(&self.scope_name, scoped_type);

        let gate = {
            let mut st = self.book.lock();
            if !st.holds(&full_type) {
                return Verdict::Accept;
            }
            match st.pending.iter().find(|(t, _)| *t == full_type) {
                Some((_, gate)) => gate.clone(),
                None => {
                    let gate = Deferred::new();
                    st.pending.push((full_type.clone(), gate.clone()));
                    gate
                }
            }
        };

        self.bus.publish_with(|| {
            Event::new(EventKind::GateHeld)
                .with_scope(Arc::clone(&self.scope_name))
                .with_task(full_type)
        });
        Verdict::Defer(gate)
    }

    fn name(&self) -> &str {
        "capture-gate"
    }
}

impl Scope {
    /// Holds scheduling of every type matching `selector` until released.
    ///
    /// Applies to requests made at this scope and at descendants whose admission
    /// chain reaches it. Only the type pattern is used; bracket filters are parsed
    /// and validated but do not affect holding.
    pub fn capture(&self, selector: &str) -> Result<&Self, ScopeError> {
        let compiled = self.selector(selector)?;
        self.inner.captures.lock().captures.push(CapturePattern {
            text: selector.to_string(),
            selector: compiled,
        });
        self.bus().publish_with(|| {
            Event::new(EventKind::CaptureAdded)
                .with_scope(self.full_name())
                .with_selector(selector)
        });
        Ok(self)
    }

    /// Removes captures installed with exactly `selector` (or all of them for `*`)
    /// and opens every gate no remaining capture still holds.
    ///
    /// Returns the number of opened gates, one per held full type. A gate stays held
    /// until released even when its requests were refused further up the chain or
    /// canceled meanwhile, so it is counted here although nobody is admitted through it.
    pub fn release(&self, selector: &str) -> Result<usize, ScopeError> {
        self.selector(selector)?;
        let universal = selector.trim() == "*";

        let opened = {
            let mut st = self.inner.captures.lock();
            st.captures.retain(|c| !universal && c.text != selector);

            let (open, held): (Vec<_>, Vec<_>) = std::mem::take(&mut st.pending)
                .into_iter()
                .partition(|(full_type, _)| !st.holds(full_type));
            st.pending = held;
            open
        };

        self.bus().publish_with(|| {
            Event::new(EventKind::CaptureReleased)
                .with_scope(self.full_name())
                .with_selector(selector)
        });

        let count = opened.len();
        for (full_type, gate) in opened {
            self.bus().publish_with(|| {
                Event::new(EventKind::GateOpened)
                    .with_scope(self.full_name())
                    .with_task(full_type.as_str())
            });
            gate.resolve(());
        }
        Ok(count)
    }

    /// Number of installed captures on this scope.
    pub fn capture_count(&self) -> usize {
        self.inner.captures.lock().captures.len()
    }
}
