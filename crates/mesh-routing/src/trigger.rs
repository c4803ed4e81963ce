use std::collections::HashMap;
use std::num::Wrapping;

/// A route may emit at most one triggered update this often, regardless of
/// how often it actually changes (spec §4.5).
const PER_ROUTE_COOLDOWN_MS: u64 = 10_000;
/// Baseline global spacing between any two triggered updates.
const MIN_INTERVAL_MS: u64 = 5_000;
const MAX_INTERVAL_MS: u64 = 60_000;
const MAX_STORM_COUNTER: u8 = 4;
/// Bound on how many per-route cooldown entries are tracked at once; beyond
/// this the oldest is evicted to make room (mirrors the routing table's own
/// capacity, since a cooldown can only ever apply to a route that exists).
const DEFAULT_COOLDOWN_CAPACITY: usize = 256;

/// Loop-prevention service: per-route cooldown plus a global storm-control
/// backoff on triggered (out-of-cycle) routing updates. Every route change
/// asks this service whether it is allowed to emit a triggered update; the
/// caller should send one only on a `true` return (spec §4.5).
#[derive(Debug)]
pub struct TriggerController {
    cooldowns: HashMap<u16, u64>,
    cooldown_capacity: usize,
    last_trigger_ms: Option<u64>,
    storm_counter: u8,
    pub triggered_updates_sent: Wrapping<u32>,
    pub updates_suppressed: Wrapping<u32>,
}

impl Default for TriggerController {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerController {
    pub fn new() -> Self {
        Self {
            cooldowns: HashMap::new(),
            cooldown_capacity: DEFAULT_COOLDOWN_CAPACITY,
            last_trigger_ms: None,
            storm_counter: 0,
            triggered_updates_sent: Wrapping(0),
            updates_suppressed: Wrapping(0),
        }
    }

    fn effective_min_interval_ms(&self) -> u64 {
        (MIN_INTERVAL_MS.saturating_mul(1 << self.storm_counter)).min(MAX_INTERVAL_MS)
    }

    fn record_cooldown(&mut self, address: u16, now_ms: u64) {
        if self.cooldowns.len() >= self.cooldown_capacity && !self.cooldowns.contains_key(&address) {
            if let Some(&oldest) = self.cooldowns.iter().min_by_key(|(_, &t)| t).map(|(a, _)| a) {
                self.cooldowns.remove(&oldest);
            }
        }
        self.cooldowns.insert(address, now_ms);
    }

    /// Called whenever a route is created, strictly improved, or expires.
    /// Returns whether a triggered update should actually be sent.
    pub fn on_route_changed(&mut self, address: u16, now_ms: u64) -> bool {
        if let Some(&last) = self.cooldowns.get(&address) {
            if now_ms.saturating_sub(last) < PER_ROUTE_COOLDOWN_MS {
                self.updates_suppressed += Wrapping(1);
                tracing::trace!(address, "triggered update suppressed: per-route cooldown");
                return false;
            }
        }
        self.record_cooldown(address, now_ms);

        if let Some(last_trigger) = self.last_trigger_ms {
            let gap_ms = now_ms.saturating_sub(last_trigger);
            if gap_ms < 2 * MIN_INTERVAL_MS {
                self.storm_counter = (self.storm_counter + 1).min(MAX_STORM_COUNTER);
            } else if self.storm_counter > 0 {
                self.storm_counter -= 1;
            }
            if gap_ms < self.effective_min_interval_ms() {
                self.updates_suppressed += Wrapping(1);
                tracing::trace!(address, gap_ms, "triggered update suppressed: storm control");
                return false;
            }
        }

        self.last_trigger_ms = Some(now_ms);
        self.triggered_updates_sent += Wrapping(1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_change_always_triggers() {
        let mut t = TriggerController::new();
        assert!(t.on_route_changed(1, 0));
    }

    #[test]
    fn rapid_flap_on_same_route_is_suppressed() {
        let mut t = TriggerController::new();
        assert!(t.on_route_changed(1, 0));
        assert!(!t.on_route_changed(1, 5_000));
        assert_eq!(t.updates_suppressed, Wrapping(1));
    }

    #[test]
    fn different_routes_respect_global_storm_control() {
        let mut t = TriggerController::new();
        assert!(t.on_route_changed(1, 0));
        assert!(!t.on_route_changed(2, 1_000));
        assert!(t.on_route_changed(3, 20_000));
    }
}
