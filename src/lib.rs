//! # taskscope
//!
//! **Taskscope** is a hierarchical task coordination engine.
//!
//! It keeps a registry of in-flight tasks tagged with dotted type names, organized
//! into nested scopes that form an ownership tree. It answers three questions:
//! which tasks currently match a pattern, whether a task of a given type may start
//! now, and how to hold a task back until an explicit release.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                    ┌──────────────────────────────────────────┐
//!                    │ Coordinator (host-owned entry point)     │
//!                    │  - root Scope ("")                       │
//!                    │  - Bus (broadcast events)                │
//!                    │  - listener ──► SubscriberSet            │
//!                    └──────────────┬───────────────────────────┘
//!                                   ▼
//!     ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐
//!     │  Scope "a"   │   │   Scope "a.x"    │   │  Scope "b"   │
//!     │ schedulers   │◄──│ schedulers       │   │ schedulers   │
//!     │ captures     │   │ captures         │   │ captures     │
//!     └──────┬───────┘   └────────┬─────────┘   └──────┬───────┘
//!            │ create / find / cancel / schedule       │
//!            ▼                    ▼                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │   Registry (shared by the whole tree, insertion ordered)          │
//! │   Task { full_type, status, creator lineage, Deferred<()> }       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Scheduling
//! ```text
//! scope.schedule("job")
//!   ├─► create (or reuse) the task, status = scheduling
//!   ├─► scope.allowed("job")
//!   │     ├─ capture gate, then schedulers (first refusal wins)
//!   │     └─ owner.allowed("<relative>.job") ... up to the root
//!   │
//!   ├─ Accept  ──► running, request resolves with the task
//!   ├─ Refuse  ──► task and request reject with the same reason
//!   └─ Defer   ──► scheduled; once every vote resolves:
//!                    ├─ still pending ──► running, request resolves
//!                    └─ settled meanwhile (canceled) ──► request rejects
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                      |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------|
//! | **Scopes**        | Ownership tree over one shared task registry.                 | [`Scope`], [`Coordinator`]              |
//! | **Tasks**         | Settle-once task records with payload and continuations.      | [`Task`], [`TaskStatus`], [`Deferred`]  |
//! | **Selectors**     | Wildcard type patterns with status/owner filters.             | [`Selector`], [`StatusFilter`]          |
//! | **Admission**     | Chained, possibly deferred, scheduling predicates.             | [`Scheduler`], [`SchedulerFn`], [`Verdict`] |
//! | **Subscriber API**| Hook into engine events (logging, metrics, custom).           | [`Subscribe`], [`Event`]                |
//! | **Errors**        | Typed configuration errors and rejection reasons.             | [`ScopeError`], [`Rejection`]           |
//! | **Configuration** | Bus sizing and event switch.                                  | [`Config`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskscope::{Config, Coordinator, Rejection, SchedulerFn, Verdict};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn taskscope::Subscribe>> = vec![Arc::new(taskscope::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn taskscope::Subscribe>> = Vec::new();
//!
//!     let coord = Coordinator::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let db = coord.root().context("db")?;
//!     db.add_scheduler(SchedulerFn::arc("frozen", |t: &str| {
//!         if t.starts_with("migrate") { Verdict::from("migrations frozen") } else { Verdict::Accept }
//!     }));
//!
//!     // Hold every report until the nightly window opens.
//!     db.capture("report.*")?;
//!     let report = db.schedule("report.daily")?;
//!     assert_eq!(db.find("* [scheduled]")?.len(), 1);
//!
//!     let refused = db.schedule("migrate.v2")?.await;
//!     assert_eq!(refused.err(), Some(Rejection::reason("migrations frozen")));
//!
//!     db.release("report.*")?;
//!     let task = report.await?;
//!     task.resolve();
//!
//!     coord.shutdown().await;
//!     Ok(())
//! }
//! ```

mod admission;
mod config;
mod deferred;
mod error;
mod events;
mod naming;
mod scope;
mod selector;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use admission::{Scheduler, SchedulerFn, SchedulerRef, Verdict};
pub use config::Config;
pub use deferred::{Deferred, Outcome};
pub use error::{Rejection, ScopeError};
pub use events::{Bus, Event, EventKind};
pub use scope::{Coordinator, CoordinatorBuilder, Schedulable, Scope, ScopeId, When};
pub use selector::{OwnerFilter, Selector, StatusFilter};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Task, TaskId, TaskStatus};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
