//! Routing-table manager (spec §4.4 table, priority 2): periodic timeout
//! sweep over the routing table, every `default_timeout_s`.

use std::sync::Arc;
use std::time::Duration;

use crate::engine::{EngineInner, EngineState};
use crate::tasks::running;

pub(crate) fn run(inner: Arc<EngineInner>) {
    let period = Duration::from_millis(inner.config.default_timeout_ms());
    while running(&inner) {
        let now_ms = inner.platform.monotonic_ms();
        {
            let mut state = inner.state.lock().expect("engine state poisoned");
            let EngineState { routing, trigger, .. } = &mut *state;
            routing.manage_timeouts(now_ms, trigger);
        }

        let state = inner.state.lock().expect("engine state poisoned");
        let _ = inner
            .wake
            .wait_timeout_while(state, period, |_| running(&inner))
            .expect("engine state poisoned");
    }
}
