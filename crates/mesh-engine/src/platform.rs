//! The platform collaborator (spec §1: out of scope) — monotonic time,
//! randomness, and the hardware unique id the local address derives from.

use std::sync::Mutex;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

pub trait Platform: Send + Sync + std::fmt::Debug {
    fn monotonic_ms(&self) -> u64;
    fn random_u32(&self) -> u32;
    /// Stable for the process's lifetime; [`crate::engine::Engine::local_address`]
    /// takes its low 16 bits (spec §6.3).
    fn hardware_unique_id(&self) -> u64;
}

/// Host build: wall-clock monotonic time, thread-local RNG, and a unique id
/// drawn once at construction (standing in for a hardware serial read).
#[derive(Debug)]
pub struct StdPlatform {
    start: Instant,
    unique_id: u64,
}

impl Default for StdPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl StdPlatform {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            unique_id: rand::thread_rng().gen(),
        }
    }

    /// Pins the local address to a specific value, useful for host binaries
    /// that want a stable, human-chosen node id instead of a random one.
    pub fn with_unique_id(unique_id: u64) -> Self {
        Self {
            start: Instant::now(),
            unique_id,
        }
    }
}

impl Platform for StdPlatform {
    fn monotonic_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn random_u32(&self) -> u32 {
        rand::thread_rng().next_u32()
    }

    fn hardware_unique_id(&self) -> u64 {
        self.unique_id
    }
}

/// Deterministic clock and seeded RNG for tests (grounded in the teacher's
/// `ManualTimeProvider`, spec §2.1's test-tooling expansion).
#[derive(Debug)]
pub struct ManualPlatform {
    now_ms: Mutex<u64>,
    rng: Mutex<StdRng>,
    unique_id: u64,
}

impl ManualPlatform {
    pub fn new(unique_id: u64, seed: u64) -> Self {
        Self {
            now_ms: Mutex::new(0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            unique_id,
        }
    }

    pub fn advance(&self, delta_ms: u64) {
        *self.now_ms.lock().expect("manual clock poisoned") += delta_ms;
    }

    pub fn set(&self, now_ms: u64) {
        *self.now_ms.lock().expect("manual clock poisoned") = now_ms;
    }
}

impl Platform for ManualPlatform {
    fn monotonic_ms(&self) -> u64 {
        *self.now_ms.lock().expect("manual clock poisoned")
    }

    fn random_u32(&self) -> u32 {
        self.rng.lock().expect("manual rng poisoned").next_u32()
    }

    fn hardware_unique_id(&self) -> u64 {
        self.unique_id
    }
}
