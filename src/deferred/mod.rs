//! # Settle-once deferred values.
//!
//! Every task and every scheduling request is observed through a [`Deferred`]:
//! a shared cell that is resolved or rejected exactly once and drives the
//! continuations attached to it.
//!
//! ## Contents
//! - [`Deferred`] the primitive (resolve / reject / continuations / `await`)
//! - [`Deferred::all`] "all must succeed" combinator used by the admission chain
//!
//! ## Rules
//! - First writer wins; later `resolve`/`reject` calls return `false`.
//! - Continuations run synchronously inside the settling call, in registration
//!   order, with no internal lock held (they may call back into scopes).
//! - Awaiting is optional and needs a tokio runtime only for the wake-up.

mod all;
mod deferred;

pub use deferred::{Deferred, Outcome};
