//! Engine events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by scopes and task settlement hooks.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scope` operations (`context`, `create`, `schedule`, `capture`,
//!   `release`, ...), task settlement hooks, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the `Coordinator` listener (fans out to `SubscriberSet`) and any
//!   receiver obtained from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
