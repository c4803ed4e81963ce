use std::collections::VecDeque;

/// Identifies a hello by its originator and 8-bit sequence id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketIdentifier {
    pub source: u16,
    pub packet_id: u8,
    pub timestamp_ms: u64,
}

const DEFAULT_CAPACITY: usize = 50;
const DEFAULT_TTL_MS: u64 = 300_000;

/// Fixed-size circular cache of recently seen `(source, packet_id)` pairs,
/// used to suppress reprocessing a hello that arrived via more than one
/// neighbour (spec §4.2, duplicate suppression).
#[derive(Debug)]
pub struct DuplicateCache {
    entries: VecDeque<PacketIdentifier>,
    capacity: usize,
    ttl_ms: u64,
}

impl Default for DuplicateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateCache {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(DEFAULT_CAPACITY),
            capacity: DEFAULT_CAPACITY,
            ttl_ms: DEFAULT_TTL_MS,
        }
    }

    /// Returns `true` and leaves the cache unchanged if this identifier was
    /// already seen within the TTL; otherwise records it and returns `false`.
    pub fn check_and_record(&mut self, source: u16, packet_id: u8, now_ms: u64) -> bool {
        let duplicate = self.entries.iter().any(|e| {
            e.source == source
                && e.packet_id == packet_id
                && now_ms.saturating_sub(e.timestamp_ms) < self.ttl_ms
        });
        if duplicate {
            return true;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(PacketIdentifier {
            source,
            packet_id,
            timestamp_ms: now_ms,
        });
        false
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
