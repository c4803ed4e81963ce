/// An in-flight outbound reliable transfer, tracked in `Q_WSP` (spec §4.3.1).
#[derive(Debug, Clone)]
pub struct OutboundSequence {
    pub dest: u16,
    pub via: u16,
    pub seq_id: u8,
    pub num_packets: u16,
    pub last_ack: u16,
    pub first_ack_received: bool,
    pub n_timeouts: u8,
    /// Fragment payloads, 0-indexed; fragment number `k` (1-based) lives at `[k - 1]`.
    pub fragments: Vec<Vec<u8>>,
    pub timeout_at_ms: u64,
    pub current_timeout_ms: u64,
    /// Timestamp the most recent packet of this sequence was sent, for RTT sampling.
    pub sent_at_ms: u64,
}

/// An in-flight inbound reliable transfer, tracked in `Q_WRP` (spec §4.3.2).
#[derive(Debug, Clone)]
pub struct InboundSequence {
    pub src: u16,
    pub via: u16,
    pub seq_id: u8,
    pub num_packets: u16,
    pub last_ack: u16,
    pub fragments: Vec<Vec<u8>>,
    pub timeout_at_ms: u64,
    pub current_timeout_ms: u64,
    pub n_timeouts: u8,
    /// Timestamp of the last fragment/SYNC handled, used as the RTT sample anchor.
    pub last_event_ms: u64,
}
