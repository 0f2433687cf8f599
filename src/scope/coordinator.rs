//! # Coordinator: root scope plus event plumbing.
//!
//! [`Coordinator`] is the explicit, host-owned entry point. It builds the root
//! [`Scope`], the event [`Bus`] and, when subscribers are configured, a listener
//! that forwards bus events to a [`SubscriberSet`].
//!
//! ```text
//! CoordinatorBuilder::new(cfg)
//!     .with_subscribers(subs)
//!     .build() ──► Coordinator { root, bus, listener }
//!                          │
//!   Scope ops ── publish ──► Bus ──► listener ──► SubscriberSet::emit
//!                                        ▲
//!                     shutdown() ── token.cancel() (drains, then stops workers)
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::Scope;

/// Builder for a [`Coordinator`].
pub struct CoordinatorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl CoordinatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive engine events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the root scope and starts the subscriber listener.
    ///
    /// Must be called inside a tokio runtime when subscribers are configured.
    pub fn build(self) -> Coordinator {
        let bus = if self.cfg.events {
            Bus::new(self.cfg.bus_capacity_clamped())
        } else {
            Bus::muted()
        };
        let token = CancellationToken::new();

        let listener = (bus.is_enabled() && !self.subscribers.is_empty()).then(|| {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            spawn_listener(&bus, set, token.clone())
        });

        Coordinator {
            root: Scope::root_with(bus.clone()),
            bus,
            token,
            listener,
        }
    }
}

/// Forwards bus events to `set` until `token` is cancelled or the bus closes.
fn spawn_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(_)) => continue,
                }
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(&ev),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    })
}

/// Owner of one coordination domain.
///
/// # Example
/// ```
/// use taskscope::{Config, Coordinator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let coord = Coordinator::builder(Config::default()).build();
/// let jobs = coord.root().context("jobs").unwrap();
/// let task = jobs.schedule("nightly").unwrap().await.unwrap();
/// assert_eq!(task.full_type(), "jobs.nightly");
/// task.resolve();
/// coord.shutdown().await;
/// # }
/// ```
pub struct Coordinator {
    root: Scope,
    bus: Bus,
    token: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl Coordinator {
    /// Starts a builder.
    pub fn builder(cfg: Config) -> CoordinatorBuilder {
        CoordinatorBuilder::new(cfg)
    }

    /// The root scope (full name `""`).
    pub fn root(&self) -> &Scope {
        &self.root
    }

    /// The event bus shared by every scope of this domain.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Receiver for raw engine events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Stops the listener after delivering already published events.
    ///
    /// Tasks are left as they are; cancel them first if needed.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Some(listener) = self.listener {
            let _ = listener.await;
        }
    }
}
