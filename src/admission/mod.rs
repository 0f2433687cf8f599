//! # Admission: scheduler predicates and their verdicts.
//!
//! Every scope keeps an ordered list of [`Scheduler`]s. On a scheduling request the
//! scope asks each of them (registration order), then asks its owner with the type
//! re-scoped, up to the root.
//!
//! ## Verdicts
//! - [`Verdict::Accept`]: go ahead
//! - [`Verdict::Refuse`]: stop now with a [`Rejection`](crate::Rejection) (first refusal wins)
//! - [`Verdict::Defer`]: decide later; all deferred verdicts are joined
//!
//! ```text
//! allowed(t) at a.x
//!   ├─ gate(t), s1(t), s2(t) ...           refuse → return
//!   ├─ a.allowed("x." + t)                 refuse → return
//!   │    └─ root.allowed("a.x." + t)
//!   └─ deferred? → Deferred::all(collected) : Accept
//! ```

mod scheduler;
mod verdict;

pub use scheduler::{Scheduler, SchedulerFn, SchedulerRef};
pub use verdict::Verdict;
