//! Queue manager (spec §4.4.3, priority 2): walks `Q_WSP`/`Q_WRP` every
//! `min_timeout_s`, retransmitting or abandoning sequences past their
//! deadline.

use std::sync::Arc;
use std::time::Duration;

use crate::engine::{EngineInner, EngineState};
use crate::queues::QueuedPacket;
use crate::tasks::running;

pub(crate) fn run(inner: Arc<EngineInner>) {
    let period = Duration::from_millis(inner.config.min_timeout_s * 1000);
    while running(&inner) {
        let now_ms = inner.platform.monotonic_ms();
        {
            let mut state = inner.state.lock().expect("engine state poisoned");
            let EngineState { transport, routing, send_queue, .. } = &mut *state;
            let queue_len = send_queue.len();
            let sweep = transport.manage_timeouts(now_ms, inner.local_addr, routing, queue_len, inner.config.max_packet_size);
            for resend in sweep.resends {
                send_queue.push(QueuedPacket::new(mesh_transport::priority::MAX_PRIORITY, resend));
            }
            if !sweep.failed_sends.is_empty() {
                tracing::warn!(count = sweep.failed_sends.len(), "reliable sends abandoned");
            }
        }
        inner.wake.notify_all();

        let state = inner.state.lock().expect("engine state poisoned");
        let _ = inner
            .wake
            .wait_timeout_while(state, period, |s| s.send_queue.is_empty() && running(&inner))
            .expect("engine state poisoned");
    }
}
