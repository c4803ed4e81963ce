//! Counters as a first-class struct (spec §2.2, supplemented from the
//! original's scattered globals) rather than loose integers threaded through
//! every task.

use std::num::Wrapping;
use std::sync::Mutex;

/// Monotone, wrapping 32-bit counters (spec §6.4, plus §7's `send_errors`
/// and receive-error counter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub received_data_packets: Wrapping<u32>,
    pub sent_packets: Wrapping<u32>,
    pub received_hello_packets: Wrapping<u32>,
    pub sent_hello_packets: Wrapping<u32>,
    pub received_broadcast_packets: Wrapping<u32>,
    pub forwarded_packets: Wrapping<u32>,
    pub data_packet_for_me: Wrapping<u32>,
    pub received_i_am_via: Wrapping<u32>,
    pub destiny_unreachable: Wrapping<u32>,
    pub received_not_for_me: Wrapping<u32>,
    pub received_payload_bytes: Wrapping<u32>,
    pub received_control_bytes: Wrapping<u32>,
    pub sent_payload_bytes: Wrapping<u32>,
    pub sent_control_bytes: Wrapping<u32>,
    pub duplicates_detected: Wrapping<u32>,
    pub triggered_updates_sent: Wrapping<u32>,
    pub updates_suppressed: Wrapping<u32>,
    pub send_errors: Wrapping<u32>,
    pub receive_errors: Wrapping<u32>,
}

/// Mutex-guarded counter set; a [`Stats::snapshot`] is `Copy` so diagnostics
/// can read it without holding the engine's lock (spec §2.2).
#[derive(Debug, Default)]
pub struct StatsCell(Mutex<Stats>);

impl StatsCell {
    pub fn new() -> Self {
        Self(Mutex::new(Stats::default()))
    }

    pub fn snapshot(&self) -> Stats {
        *self.0.lock().expect("stats mutex poisoned")
    }

    pub fn update(&self, f: impl FnOnce(&mut Stats)) {
        let mut guard = self.0.lock().expect("stats mutex poisoned");
        f(&mut guard);
    }
}
