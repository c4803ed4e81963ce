//! Receive-ISR handoff task (spec §4.4.1, priority 6 — the highest of the
//! six). The only task that touches the radio's receive side.

use std::sync::Arc;

use crate::engine::{EngineInner, RawFrame};
use crate::tasks::{running, RECEIVE_POLL_MS};

pub(crate) fn run(inner: Arc<EngineInner>) {
    let mut buf = vec![0u8; inner.config.max_packet_size];
    while running(&inner) {
        if !inner.radio.wait_receive_done(RECEIVE_POLL_MS) {
            continue;
        }
        let n = match inner.radio.read_data(&mut buf) {
            Ok(n) if n > 0 => n,
            Ok(_) => {
                let _ = inner.radio.start_receive();
                continue;
            }
            Err(err) => {
                tracing::warn!(?err, "receive failed");
                inner.stats.update(|s| s.receive_errors += std::num::Wrapping(1));
                let _ = inner.radio.start_receive();
                continue;
            }
        };

        let frame = RawFrame {
            bytes: buf[..n].to_vec(),
            rssi: inner.radio.get_rssi(),
            snr: inner.radio.get_snr(),
        };
        {
            let mut state = inner.state.lock().expect("engine state poisoned");
            state.raw_received.push(frame);
            inner.wake.notify_all();
        }
        let _ = inner.radio.start_receive();
    }
}
