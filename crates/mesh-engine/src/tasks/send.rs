//! Send task (spec §4.4.2, priority 5): carrier-sense backoff, duty-cycle
//! pacing, bounded retransmission on transient transmit failure.

use std::num::Wrapping;
use std::sync::Arc;
use std::time::Duration;

use mesh_proto::constants::type_bits;

use crate::engine::EngineInner;
use crate::queues::QueuedPacket;
use crate::tasks::{running, MAX_RESEND_PACKET, MAX_TRY_BEFORE_SEND, SEND_IDLE_POLL_MS};

pub(crate) fn run(inner: Arc<EngineInner>) {
    while running(&inner) {
        let entry = {
            let state = inner.state.lock().expect("engine state poisoned");
            let (mut state, _) = inner
                .wake
                .wait_timeout_while(
                    state,
                    Duration::from_millis(SEND_IDLE_POLL_MS),
                    |s| s.send_queue.is_empty() && running(&inner),
                )
                .expect("engine state poisoned");
            state.send_queue.pop()
        };
        let Some(mut entry) = entry else { continue };
        if !running(&inner) {
            break;
        }

        if type_bits::is_data(entry.packet.kind()) && entry.packet.header.dst != mesh_proto::BROADCAST {
            let via = inner
                .state
                .lock()
                .expect("engine state poisoned")
                .routing
                .next_hop(entry.packet.header.dst);
            if via == 0 {
                inner.stats.update(|s| s.destiny_unreachable += Wrapping(1));
                tracing::debug!(dst = entry.packet.header.dst, "send abandoned: no route");
                continue;
            }
            if let Some(data_sub) = entry.packet.data_sub.as_mut() {
                data_sub.via = via;
            }
        }

        if !wait_before_send(&inner, entry.resend_count) {
            // channel stayed busy through every retry: give up on this slot,
            // the entry was not consumed so simply drop it (spec §4.4.2).
            continue;
        }

        let frame = entry.packet.encode();
        match inner.radio.transmit(&frame) {
            Ok(()) => {
                inner.stats.update(|s| {
                    s.sent_packets += Wrapping(1);
                    s.sent_payload_bytes += Wrapping(entry.packet.payload.len() as u32);
                    if type_bits::is_hello(entry.packet.kind()) {
                        s.sent_hello_packets += Wrapping(1);
                    }
                });
                let _ = inner.radio.start_receive();
                let time_on_air = inner.radio.get_time_on_air(frame.len());
                let duty_cycle_delay = time_on_air * (100 - inner.config.duty_cycle_pct as u64) / 100;
                if duty_cycle_delay > 0 {
                    std::thread::sleep(Duration::from_millis(duty_cycle_delay));
                }
            }
            Err(err) => {
                tracing::warn!(?err, "transmit failed");
                inner.stats.update(|s| s.send_errors += Wrapping(1));
                if entry.resend_count < MAX_RESEND_PACKET {
                    entry.resend_count += 1;
                    entry.priority = mesh_transport::priority::MAX_PRIORITY;
                    let mut state = inner.state.lock().expect("engine state poisoned");
                    state.send_queue.push(entry);
                    inner.wake.notify_all();
                }
                let _ = inner.radio.start_receive();
            }
        }
    }
}

/// Randomised carrier-sense backoff (spec §4.4.2 step 3): delay in
/// `[2T, 4T + (retries + rt_size) * 100]` ms, then scan; retried up to
/// `MAX_TRY_BEFORE_SEND` times. Returns `true` once the channel is clear.
fn wait_before_send(inner: &Arc<EngineInner>, resend_count: u32) -> bool {
    let t = inner.radio.get_time_on_air(inner.config.max_packet_size);
    let rt_size = inner.state.lock().expect("engine state poisoned").routing.len() as u64;
    let lower = 2 * t;
    let span = (2 * t).saturating_add((resend_count as u64 + rt_size) * 100);

    for _ in 0..MAX_TRY_BEFORE_SEND {
        let jitter = if span == 0 { 0 } else { (inner.platform.random_u32() as u64) % (span + 1) };
        let delay_ms = lower + jitter;
        std::thread::sleep(Duration::from_millis(delay_ms));

        match inner.radio.scan_channel() {
            Ok(busy) if !busy => return true,
            Ok(_) => {
                let _ = inner.radio.start_receive();
            }
            Err(err) => {
                tracing::warn!(?err, "channel scan failed");
                return true;
            }
        }
    }
    false
}
