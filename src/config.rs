//! # Global engine configuration.
//!
//! Provides [`Config`], the settings a host passes once when it builds the root
//! scope through [`Coordinator::builder`](crate::Coordinator::builder).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]
//! - `events = false` → nothing is published on the bus

/// Global configuration for a coordination domain (one root scope and its tree).
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped)
/// - `events`: Whether scopes publish [`Event`](crate::Event)s at all
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// skip older items.
    pub bus_capacity: usize,

    /// Publish engine events on the bus.
    ///
    /// Disabling this removes the (small) cost of building events for hosts that
    /// never subscribe.
    pub events: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `events = true`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            events: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(Config::default().bus_capacity_clamped(), 1024);
    }
}
