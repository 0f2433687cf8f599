//! Error types used by the coordination engine and its tasks.
//!
//! This module defines two main error enums:
//!
//! - [`ScopeError`]: configuration errors raised synchronously by the call that
//!   introduced the bad value (`context`, `create`, `find`, `capture`, ...).
//! - [`Rejection`]: the reason a task (or a scheduling request) settled as failed.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::sync::Arc;
use thiserror::Error;

/// # Configuration errors produced by scopes.
///
/// These are programmer errors: an invalid type string, scope name or selector.
/// They are never recovered internally.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// A (fully qualified) task type does not follow the dotted type grammar.
    #[error("invalid type {value:?}")]
    InvalidType {
        /// The rejected type string.
        value: String,
    },

    /// A relative scope name does not follow the dotted type grammar.
    #[error("invalid scope {value:?}")]
    InvalidScope {
        /// The rejected scope name.
        value: String,
    },

    /// A selector string could not be parsed.
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector {
        /// The rejected selector text.
        selector: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl ScopeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskscope::ScopeError;
    ///
    /// let err = ScopeError::InvalidType { value: "Foo".into() };
    /// assert_eq!(err.as_label(), "invalid_type");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScopeError::InvalidType { .. } => "invalid_type",
            ScopeError::InvalidScope { .. } => "invalid_scope",
            ScopeError::InvalidSelector { .. } => "invalid_selector",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScopeError::InvalidType { value } => format!("type={value}"),
            ScopeError::InvalidScope { value } => format!("scope={value}"),
            ScopeError::InvalidSelector { selector, reason } => {
                format!("selector={selector} reason={reason}")
            }
        }
    }

    pub(crate) fn selector(selector: &str, reason: impl Into<String>) -> Self {
        ScopeError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

/// # Reason a task or scheduling request was rejected.
///
/// Admission refusals are not errors of the engine: a scheduler answers `false`
/// ([`Rejection::Refused`]) or a descriptive string ([`Rejection::Reason`]).
/// [`Rejection::Canceled`] is reserved for [`Scope::cancel`](crate::Scope::cancel).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Refused without a reason.
    #[error("refused")]
    Refused,

    /// Refused (or failed) with a human-readable reason.
    #[error("{0}")]
    Reason(Arc<str>),

    /// Canceled through a scope.
    #[error("canceled")]
    Canceled,

    /// The task settled on another path while it was waiting for admission.
    #[error("task settled before admission")]
    Settled,
}

impl Rejection {
    /// Builds a [`Rejection::Reason`].
    pub fn reason(reason: impl Into<Arc<str>>) -> Self {
        Rejection::Reason(reason.into())
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskscope::Rejection;
    ///
    /// assert_eq!(Rejection::Canceled.as_label(), "task_canceled");
    /// assert_eq!(Rejection::reason("busy").as_label(), "task_refused_reason");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Rejection::Refused => "task_refused",
            Rejection::Reason(_) => "task_refused_reason",
            Rejection::Canceled => "task_canceled",
            Rejection::Settled => "task_settled",
        }
    }

    /// Returns the reason string, if the rejection carries one.
    pub fn as_reason(&self) -> Option<&str> {
        match self {
            Rejection::Reason(r) => Some(&**r),
            Rejection::Canceled => Some("canceled"),
            _ => None,
        }
    }

    /// True if the rejection came from [`Scope::cancel`](crate::Scope::cancel).
    pub fn is_canceled(&self) -> bool {
        matches!(self, Rejection::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canceled_displays_fixed_reason() {
        assert_eq!(Rejection::Canceled.to_string(), "canceled");
        assert_eq!(Rejection::Canceled.as_reason(), Some("canceled"));
        assert!(Rejection::Canceled.is_canceled());
    }

    #[test]
    fn test_reason_round_trips_text() {
        let r = Rejection::reason("queue full");
        assert_eq!(r.to_string(), "queue full");
        assert_eq!(r.as_reason(), Some("queue full"));
        assert!(!r.is_canceled());
        assert_eq!(Rejection::Refused.as_reason(), None);
    }

    #[test]
    fn test_selector_error_message() {
        let err = ScopeError::selector("foo [bar]", "unknown property \"bar\"");
        assert_eq!(err.as_label(), "invalid_selector");
        assert!(err.to_string().contains("unknown property"));
    }
}
