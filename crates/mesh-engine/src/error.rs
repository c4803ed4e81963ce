use thiserror::Error;

/// Closed error enum for the engine and the radio/platform boundary it sits
/// on (spec §7, §9 "exceptions for control flow → explicit result values").
///
/// Only construction-time validation and queue-capacity checks return this
/// to a caller synchronously; everything a running task encounters is
/// handled in-task and surfaces only as a [`crate::stats::Stats`] counter or
/// a log line, per §7's error-handling policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("radio transmit/receive failure")]
    Radio,
    #[error("allocation failed")]
    Memory,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("radio busy")]
    Busy,
    #[error("hardware fault")]
    Hardware,
    #[error("unsupported frequency")]
    Frequency,
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("sync word mismatch")]
    SyncWord,
    #[error("engine not initialised")]
    NotInitialised,
    #[error("operation timed out")]
    Timeout,
    #[error("buffer overflow")]
    BufferOverflow,
    #[error("reception failed")]
    Reception,
    #[error("transmission failed")]
    Transmission,
    #[error("CRC mismatch")]
    CrcMismatch,
    #[error("queue is full")]
    QueueFull,
}
