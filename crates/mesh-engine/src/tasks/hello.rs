//! Hello emitter (spec §4.4 table, priority 4): periodic broadcast of the
//! local routing view at `HELLO_PACKETS_DELAY` (`hello_interval_s`).

use std::sync::Arc;
use std::time::Duration;

use mesh_transport::priority;

use crate::engine::{make_hello, EngineInner};
use crate::queues::QueuedPacket;
use crate::tasks::running;

pub(crate) fn run(inner: Arc<EngineInner>) {
    let period = Duration::from_millis(inner.config.hello_interval_ms());
    while running(&inner) {
        {
            let mut state = inner.state.lock().expect("engine state poisoned");
            let hello = make_hello(&mut state, &inner);
            state.send_queue.push(QueuedPacket::new(priority::HELLO_PRIORITY, hello));
        }
        inner.wake.notify_all();

        // Sleeps in a condvar wait so `standby()`'s notify wakes this task
        // immediately instead of at the next hello interval.
        let state = inner.state.lock().expect("engine state poisoned");
        let _ = inner
            .wake
            .wait_timeout_while(state, period, |_| running(&inner))
            .expect("engine state poisoned");
    }
}
