//! The application-facing engine handle (spec §6.3, §9 "global singleton →
//! explicit engine handle"): one [`Engine`] per radio, cloneable, shareable
//! across the six scheduler tasks it owns.

use std::num::Wrapping;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use mesh_proto::{factory, AppPacket, Packet};
use mesh_routing::{DuplicateCache, RoutingTable, TriggerController};
use mesh_transport::TransportManager;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::platform::Platform;
use crate::queues::{BoundedQueue, QueuedPacket, SendQueue};
use crate::radio::Radio;
use crate::stats::StatsCell;
use crate::tasks;

const RAW_QUEUE_CAPACITY: usize = 32;
const APP_QUEUE_CAPACITY: usize = 32;
const SEND_QUEUE_CAPACITY: usize = 64;

/// A just-received frame plus the link-quality reading taken immediately
/// after it (spec §4.4.1: "annotates with rssi, snr").
pub(crate) struct RawFrame {
    pub bytes: Vec<u8>,
    pub rssi: i8,
    pub snr: i8,
}

/// Everything the six scheduler tasks share and must serialize access to
/// (spec §5: "all mutable routing/transport/queue state behind a single
/// mutex, with the radio and platform handles living outside it").
pub(crate) struct EngineState {
    pub routing: RoutingTable,
    pub transport: TransportManager,
    pub dup_cache: DuplicateCache,
    pub trigger: TriggerController,
    pub send_queue: SendQueue,
    pub raw_received: BoundedQueue<RawFrame>,
    pub received_app: BoundedQueue<AppPacket>,
    pub next_hello_id: Wrapping<u8>,
    pub next_data_id: Wrapping<u8>,
}

pub(crate) struct EngineInner {
    pub config: EngineConfig,
    pub local_addr: u16,
    pub platform: Arc<dyn Platform>,
    pub radio: Arc<dyn Radio>,
    pub state: Mutex<EngineState>,
    /// Signalled whenever the send queue, raw-receive queue, or running flag
    /// changes, so a sleeping task wakes immediately instead of at its next
    /// poll tick.
    pub wake: Condvar,
    pub stats: StatsCell,
    pub running: AtomicBool,
}

/// Handle to a running mesh node. Cloning shares the same underlying engine;
/// dropping the last clone does not stop it — call [`Engine::standby`] first.
#[derive(Clone)]
pub struct Engine {
    pub(crate) inner: Arc<EngineInner>,
    threads: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Engine {
    /// Validates `config`, derives the local address from the platform's
    /// hardware id, and constructs the (not yet running) engine (spec §6.2,
    /// §6.3 `init`).
    pub fn new(
        config: EngineConfig,
        platform: Arc<dyn Platform>,
        radio: Arc<dyn Radio>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let local_addr = platform.hardware_unique_id() as u16;
        let state = EngineState {
            routing: RoutingTable::new(local_addr, config.rt_max_size),
            transport: TransportManager::new(),
            dup_cache: DuplicateCache::new(),
            trigger: TriggerController::new(),
            send_queue: SendQueue::new(SEND_QUEUE_CAPACITY),
            raw_received: BoundedQueue::new(RAW_QUEUE_CAPACITY),
            received_app: BoundedQueue::new(APP_QUEUE_CAPACITY),
            next_hello_id: Wrapping(0),
            next_data_id: Wrapping(0),
        };
        let inner = Arc::new(EngineInner {
            config,
            local_addr,
            platform,
            radio,
            state: Mutex::new(state),
            wake: Condvar::new(),
            stats: StatsCell::new(),
            running: AtomicBool::new(false),
        });
        Ok(Self {
            inner,
            threads: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Arms the radio and spawns the six scheduler tasks (spec §5, §6.3 `start`).
    pub fn start(&self) -> Result<(), EngineError> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.radio.start_receive()?;
        let mut threads = self.threads.lock().expect("thread list poisoned");
        *threads = tasks::spawn_all(self.inner.clone());
        Ok(())
    }

    /// Stops every scheduler task and parks the radio (spec §6.3 `standby`).
    pub fn standby(&self) -> Result<(), EngineError> {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        {
            let _guard = self.inner.state.lock().expect("engine state poisoned");
            self.inner.wake.notify_all();
        }
        let mut threads = self.threads.lock().expect("thread list poisoned");
        for handle in threads.drain(..) {
            let _ = handle.join();
        }
        self.inner.radio.standby()
    }

    pub fn local_address(&self) -> u16 {
        self.inner.local_addr
    }

    pub fn stats(&self) -> crate::stats::Stats {
        self.inner.stats.snapshot()
    }

    pub fn routing_table_size(&self) -> usize {
        self.inner.state.lock().expect("engine state poisoned").routing.len()
    }

    pub fn send_queue_size(&self) -> usize {
        self.inner.state.lock().expect("engine state poisoned").send_queue.len()
    }

    pub fn received_queue_size(&self) -> usize {
        self.inner.state.lock().expect("engine state poisoned").received_app.len()
    }

    /// Pops the next fully-reassembled application packet, if any (spec §6.3).
    pub fn next_app_packet(&self) -> Option<AppPacket> {
        self.inner
            .state
            .lock()
            .expect("engine state poisoned")
            .received_app
            .pop()
    }

    /// Best-effort send: no ACK, no retransmission, silently dropped if the
    /// destination is unknown and not a broadcast (spec §6.3 `sendData`).
    pub fn send_data(&self, dest: u16, payload: Vec<u8>) -> Result<(), EngineError> {
        if payload.is_empty() {
            return Err(EngineError::InvalidParameter("payload must not be empty".into()));
        }
        let mut state = self.inner.state.lock().expect("engine state poisoned");
        let via = if dest == mesh_proto::BROADCAST {
            mesh_proto::BROADCAST
        } else {
            let via = state.routing.next_hop(dest);
            if via == 0 {
                return Err(EngineError::InvalidParameter(format!("no route to {dest}")));
            }
            via
        };
        let id = state.next_data_id.0;
        state.next_data_id += Wrapping(1);
        let packet = factory::data(dest, self.inner.local_addr, id, via, payload, self.inner.config.max_packet_size);
        state
            .send_queue
            .push(QueuedPacket::new(mesh_transport::priority::DATA_PRIORITY, packet));
        drop(state);
        self.inner.wake.notify_all();
        Ok(())
    }

    /// Reliable send: fragments `payload`, opens a tracked sequence, and
    /// enqueues the opening SYNC packet (spec §4.3, §6.3 `sendDataReliable`).
    pub fn send_reliable(&self, dest: u16, payload: Vec<u8>) -> Result<(), EngineError> {
        let mut state = self.inner.state.lock().expect("engine state poisoned");
        let now_ms = self.inner.platform.monotonic_ms();
        let EngineState { routing, transport, .. } = &mut *state;
        let sync_packet = transport
            .send_reliable(dest, payload, self.inner.local_addr, routing, self.inner.config.max_packet_size, now_ms)
            .map_err(|e| EngineError::InvalidParameter(e.to_string()))?;
        state
            .send_queue
            .push(QueuedPacket::new(mesh_transport::priority::DATA_PRIORITY, sync_packet));
        drop(state);
        self.inner.wake.notify_all();
        Ok(())
    }
}

pub(crate) fn make_hello(state: &mut EngineState, inner: &EngineInner) -> Packet {
    state.routing.update_expected_hellos();
    let nodes = state.routing.all_network_nodes();
    let id = state.next_hello_id.0;
    state.next_hello_id += Wrapping(1);
    factory::hello(inner.local_addr, id, &nodes, inner.config.max_packet_size)
}
