use std::fmt;

use crate::deferred::Deferred;
use crate::error::Rejection;

/// Answer of a scheduler (or of a whole admission chain).
///
/// The `From` conversions mirror the classic predicate protocol:
/// `true` accepts, `false` refuses, a string refuses with a reason and a
/// deferred postpones the decision.
///
/// # Example
/// ```
/// use taskscope::{Deferred, Rejection, Verdict};
///
/// assert!(Verdict::from(true).is_accept());
/// assert_eq!(Verdict::from(false), Verdict::Refuse(Rejection::Refused));
/// assert_eq!(Verdict::from("busy"), Verdict::Refuse(Rejection::reason("busy")));
/// assert!(Verdict::from(Deferred::<()>::new()).is_defer());
/// ```
#[derive(Clone)]
pub enum Verdict {
    /// Admit.
    Accept,
    /// Refuse with a reason.
    Refuse(Rejection),
    /// Admit once the deferred resolves; refuse if it rejects.
    Defer(Deferred<()>),
}

impl Verdict {
    /// Refusal without a reason.
    pub fn refuse() -> Self {
        Verdict::Refuse(Rejection::Refused)
    }

    /// Refusal with a human-readable reason.
    pub fn refuse_with(reason: impl Into<std::sync::Arc<str>>) -> Self {
        Verdict::Refuse(Rejection::reason(reason))
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    pub fn is_refuse(&self) -> bool {
        matches!(self, Verdict::Refuse(_))
    }

    pub fn is_defer(&self) -> bool {
        matches!(self, Verdict::Defer(_))
    }

    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Verdict::Accept => "accept",
            Verdict::Refuse(_) => "refuse",
            Verdict::Defer(_) => "defer",
        }
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok {
            Verdict::Accept
        } else {
            Verdict::refuse()
        }
    }
}

impl From<&str> for Verdict {
    fn from(reason: &str) -> Self {
        Verdict::refuse_with(reason)
    }
}

impl From<String> for Verdict {
    fn from(reason: String) -> Self {
        Verdict::refuse_with(reason)
    }
}

impl From<Deferred<()>> for Verdict {
    fn from(gate: Deferred<()>) -> Self {
        Verdict::Defer(gate)
    }
}

impl From<Option<Rejection>> for Verdict {
    fn from(refusal: Option<Rejection>) -> Self {
        refusal.map_or(Verdict::Accept, Verdict::Refuse)
    }
}

impl PartialEq for Verdict {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Verdict::Accept, Verdict::Accept) => true,
            (Verdict::Refuse(a), Verdict::Refuse(b)) => a == b,
            (Verdict::Defer(a), Verdict::Defer(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => f.write_str("Accept"),
            Verdict::Refuse(r) => f.debug_tuple("Refuse").field(r).finish(),
            Verdict::Defer(d) => f.debug_tuple("Defer").field(d).finish(),
        }
    }
}
