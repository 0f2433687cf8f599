//! # Event bus for broadcasting engine events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from scopes and settlement hooks.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                  Subscriber (one):
//!   Scope a   ──┐
//!   Scope a.x ──┼──────► Bus ───────► listener ────► SubscriberSet
//!   Task hook ──┘  (broadcast chan)   (in Coordinator)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never needs a runtime.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.
//! - **Muted bus**: a bus built with `events = false` drops everything before building it.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for engine events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    enabled: bool,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx, enabled: true }
    }

    /// Creates a bus that drops every event.
    pub fn muted() -> Self {
        Self {
            enabled: false,
            ..Self::new(1)
        }
    }

    /// True if events are published at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        if self.enabled {
            let _ = self.tx.send(ev);
        }
    }

    /// Publishes a lazily built event; `build` is skipped on a muted bus or
    /// when nobody listens.
    pub fn publish_with<F>(&self, build: F)
    where
        F: FnOnce() -> Event,
    {
        if self.enabled && self.tx.receiver_count() > 0 {
            let _ = self.tx.send(build());
        }
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::TaskCreated));
        bus.publish_with(|| panic!("no receiver, must not build"));
    }

    #[test]
    fn test_receiver_sees_events_in_order() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::TaskCreated).with_task("a"));
        bus.publish_with(|| Event::new(EventKind::TaskResolved).with_task("a"));

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::TaskCreated);
        assert_eq!(second.kind, EventKind::TaskResolved);
        assert!(first.seq < second.seq);
    }

    #[test]
    fn test_muted_bus_drops_everything() {
        let bus = Bus::muted();
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::TaskCreated));
        assert!(!bus.is_enabled());
        assert!(rx.try_recv().is_err());
    }
}
