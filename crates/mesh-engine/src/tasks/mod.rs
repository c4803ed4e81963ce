//! The six cooperating scheduler tasks (spec §4.4, §5): each maps onto one
//! `std::thread`, all sharing the single [`crate::engine::EngineInner`]
//! mutex and condvar.

mod hello;
mod process;
mod queue_manager;
mod receive;
mod routing_manager;
mod send;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::engine::EngineInner;

/// How long the receive task blocks on the radio between liveness checks of
/// the running flag (spec §5: "every blocking wait uses a finite timeout").
pub(crate) const RECEIVE_POLL_MS: u64 = 1_000;
/// Send loop's periodic wake even with an empty queue (spec §4.4 table).
pub(crate) const SEND_IDLE_POLL_MS: u64 = 30_000;
pub(crate) const MAX_TRY_BEFORE_SEND: u32 = 5;
pub(crate) const MAX_RESEND_PACKET: u32 = 3;

pub(crate) fn spawn_all(inner: Arc<EngineInner>) -> Vec<JoinHandle<()>> {
    vec![
        spawn(inner.clone(), "mesh-receive", receive::run),
        spawn(inner.clone(), "mesh-process", process::run),
        spawn(inner.clone(), "mesh-send", send::run),
        spawn(inner.clone(), "mesh-hello", hello::run),
        spawn(inner.clone(), "mesh-routing-manager", routing_manager::run),
        spawn(inner, "mesh-queue-manager", queue_manager::run),
    ]
}

fn spawn(
    inner: Arc<EngineInner>,
    name: &'static str,
    body: fn(Arc<EngineInner>),
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || body(inner))
        .expect("failed to spawn scheduler task")
}

pub(crate) fn running(inner: &EngineInner) -> bool {
    inner.running.load(Ordering::SeqCst)
}
