//! In-memory mock radio for end-to-end node-pair tests (spec §2.1's
//! test-tooling expansion). Not behind `#[cfg(test)]` because integration
//! tests under `tests/` link against the compiled crate and need it too.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::error::EngineError;
use crate::radio::Radio;

#[derive(Debug)]
struct Inbox {
    queue: Mutex<VecDeque<Vec<u8>>>,
    cv: Condvar,
}

impl Inbox {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            cv: Condvar::new(),
        }
    }
}

/// A shared broadcast medium: every [`LoopbackRadio`] registered against the
/// same `Ether` receives every other registrant's transmissions, as if all
/// nodes were in range of one another.
#[derive(Debug, Default)]
pub struct Ether {
    inboxes: Mutex<HashMap<u64, Arc<Inbox>>>,
}

impl Ether {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a new node and returns a radio handle for it. `node_id`
    /// only needs to be unique within this ether.
    pub fn register(ether: &Arc<Self>, node_id: u64) -> LoopbackRadio {
        let inbox = Arc::new(Inbox::new());
        ether.inboxes.lock().expect("ether poisoned").insert(node_id, inbox.clone());
        LoopbackRadio {
            node_id,
            ether: ether.clone(),
            inbox,
            rssi: -40,
            snr: 10,
        }
    }

    fn broadcast(&self, from: u64, frame: &[u8]) {
        let inboxes = self.inboxes.lock().expect("ether poisoned");
        for (&id, inbox) in inboxes.iter() {
            if id == from {
                continue;
            }
            inbox.queue.lock().expect("inbox poisoned").push_back(frame.to_vec());
            inbox.cv.notify_one();
        }
    }
}

/// A [`Radio`] implementation backed by an [`Ether`] instead of hardware.
#[derive(Debug)]
pub struct LoopbackRadio {
    node_id: u64,
    ether: Arc<Ether>,
    inbox: Arc<Inbox>,
    pub rssi: i8,
    pub snr: i8,
}

impl Radio for LoopbackRadio {
    fn start_receive(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn wait_receive_done(&self, timeout_ms: u64) -> bool {
        let guard = self.inbox.queue.lock().expect("inbox poisoned");
        let (guard, _) = self
            .inbox
            .cv
            .wait_timeout_while(guard, Duration::from_millis(timeout_ms), |q| q.is_empty())
            .expect("inbox poisoned");
        !guard.is_empty()
    }

    fn read_data(&self, buf: &mut [u8]) -> Result<usize, EngineError> {
        let mut queue = self.inbox.queue.lock().expect("inbox poisoned");
        let Some(frame) = queue.pop_front() else {
            return Ok(0);
        };
        if frame.len() > buf.len() {
            return Err(EngineError::BufferOverflow);
        }
        buf[..frame.len()].copy_from_slice(&frame);
        Ok(frame.len())
    }

    fn get_rssi(&self) -> i8 {
        self.rssi
    }

    fn get_snr(&self) -> i8 {
        self.snr
    }

    fn get_time_on_air(&self, payload_len: usize) -> u64 {
        5 + payload_len as u64 / 4
    }

    fn scan_channel(&self) -> Result<bool, EngineError> {
        Ok(false)
    }

    fn transmit(&self, frame: &[u8]) -> Result<(), EngineError> {
        self.ether.broadcast(self.node_id, frame);
        Ok(())
    }

    fn standby(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn sleep(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
