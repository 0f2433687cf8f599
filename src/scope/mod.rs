//! # Scope tree: the coordination surface.
//!
//! A [`Scope`] is a node of an ownership tree. Every node has its own relative name,
//! admission schedulers and captures, and shares one task registry with the whole
//! tree. Forking a scope ([`Scope::context`]) creates a child, never a copy of tasks.
//!
//! ## Architecture
//! ```text
//!                  root ("")            ◄── Coordinator::builder(cfg).build().root()
//!                 /        \
//!            a ("a")      b ("b")
//!             /
//!     x ("a.x")  ── schedule("job") ──► allowed("job")
//!                                         ├─ gate + schedulers of a.x
//!                                         ├─ a.allowed("x.job")
//!                                         └─ root.allowed("a.x.job")
//!
//!   shared by all: Registry (insertion-ordered tasks) + Bus (events)
//! ```
//!
//! ## Internal modules
//! - [`tree`]: scope record, `context`, `create`, `find`, `cancel`, `remember`, `forget`
//! - [`admission`]: `add_scheduler`, `allowed`, `schedule`
//! - [`capture`]: the built-in capture/release gate
//! - [`when`]: the "wait for all of these" combinator
//! - [`coordinator`]: root construction with config and subscribers

mod admission;
mod capture;
mod coordinator;
mod tree;
mod when;

#[cfg(test)]
mod tests;

pub use admission::Schedulable;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use tree::{Scope, ScopeId};
pub use when::When;
