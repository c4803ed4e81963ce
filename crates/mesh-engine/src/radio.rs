//! The Radio collaborator (spec §1: out of scope, specified only where it
//! touches the core). The engine only ever talks to this trait; a real
//! driver and the in-memory [`LoopbackRadio`] used by tests are equally
//! valid implementations.

use crate::error::EngineError;

/// Link-quality metadata attached to a received frame, read from the radio
/// immediately after `read_data` (spec §4.4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkMetrics {
    pub rssi: i8,
    pub snr: i8,
}

/// The radio driver's public surface, as named in spec §1: `transmit`,
/// `startReceive`, `readData`, `getRSSI`, `getSNR`, `getTimeOnAir`,
/// `scanChannel`, `standby`, `sleep`, plus a receive-done interrupt hook.
///
/// The interrupt hook is modeled as [`Radio::wait_receive_done`] blocking
/// with a timeout rather than a callback-plus-static-pointer (spec §9,
/// "ISR-driver coupling → bounded-capacity channel"): on real hardware this
/// blocks on a channel an actual ISR feeds; [`LoopbackRadio`] feeds it from
/// another thread's `transmit` call.
pub trait Radio: Send + Sync + std::fmt::Debug {
    /// Arms the radio to receive; re-armed after every transmission and
    /// after every fully-drained receive-done event (spec §4.4.1, §5).
    fn start_receive(&self) -> Result<(), EngineError>;

    /// Blocks up to `timeout_ms` for a receive-done interrupt. Returns
    /// `true` if one fired, `false` on timeout (the caller should simply
    /// loop again — this is the scheduler's only unbounded-looking wait,
    /// and it is bounded per spec §5).
    fn wait_receive_done(&self, timeout_ms: u64) -> bool;

    /// Reads the just-received frame into `buf`, returning the number of
    /// bytes written. Errors map to the "malformed packet" recovery path
    /// (spec §7).
    fn read_data(&self, buf: &mut [u8]) -> Result<usize, EngineError>;

    fn get_rssi(&self) -> i8;
    fn get_snr(&self) -> i8;

    /// Time on air, in milliseconds, for a frame of `payload_len` bytes at
    /// the radio's current modulation parameters (spec §4.4.2).
    fn get_time_on_air(&self, payload_len: usize) -> u64;

    /// Channel-activity detect: `Ok(true)` if a preamble is present on the
    /// channel right now (spec §4.4.2 carrier sense).
    fn scan_channel(&self) -> Result<bool, EngineError>;

    fn transmit(&self, frame: &[u8]) -> Result<(), EngineError>;

    fn standby(&self) -> Result<(), EngineError>;
    fn sleep(&self) -> Result<(), EngineError>;
}
