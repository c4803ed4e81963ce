//! Priority send queue (spec §4.4.2, §4.4.3): strict priority order, FIFO
//! within a priority, lowest-priority eviction under pressure.

use std::collections::VecDeque;

use mesh_proto::Packet;

/// A packet sitting in [`SendQueue`], tagged with the priority it was
/// enqueued at (spec §4.3.3's `ACK_PRIORITY`/`LOST_PRIORITY`/`HELLO_PRIORITY`/
/// `DATA_PRIORITY`, or an application-chosen value up to `MAX_PRIORITY`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPacket {
    pub priority: u8,
    pub packet: Packet,
    /// How many times `radio.transmit` has already failed for this entry
    /// (spec §4.4.2 step 4, `MAX_RESEND_PACKET`).
    pub resend_count: u32,
}

impl QueuedPacket {
    pub fn new(priority: u8, packet: Packet) -> Self {
        Self { priority, packet, resend_count: 0 }
    }
}

/// Bounded priority queue backing the single outbound send path (spec §4.4.2:
/// "the send task always dequeues the highest-priority entry; ties break
/// FIFO"). Overflow drops the single lowest-priority entry to make room,
/// never the packet being inserted, so control traffic always displaces
/// stale data traffic rather than the other way round.
#[derive(Debug)]
pub struct SendQueue {
    entries: VecDeque<QueuedPacket>,
    capacity: usize,
}

impl SendQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Inserts `item` ahead of every lower-or-equal priority entry already
    /// queued, behind every strictly-higher one (keeps insertion order among
    /// equal priorities). Evicts the queue's current lowest-priority entry
    /// first if at capacity.
    pub fn push(&mut self, item: QueuedPacket) {
        if self.is_full() {
            self.evict_lowest_priority();
        }
        let pos = self
            .entries
            .iter()
            .position(|q| q.priority < item.priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, item);
    }

    pub fn pop(&mut self) -> Option<QueuedPacket> {
        self.entries.pop_front()
    }

    fn evict_lowest_priority(&mut self) {
        let Some((idx, _)) = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, q)| q.priority)
        else {
            return;
        };
        self.entries.remove(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_proto::factory;

    fn packet(src: u16) -> Packet {
        factory::hello(src, 0, &[], 100)
    }

    #[test]
    fn higher_priority_jumps_ahead_of_queued_data() {
        let mut q = SendQueue::new(8);
        q.push(QueuedPacket::new(20, packet(1)));
        q.push(QueuedPacket::new(20, packet(2)));
        q.push(QueuedPacket::new(23, packet(3)));

        assert_eq!(q.pop().unwrap().packet.header.src, 3);
        assert_eq!(q.pop().unwrap().packet.header.src, 1);
        assert_eq!(q.pop().unwrap().packet.header.src, 2);
    }

    #[test]
    fn overflow_evicts_lowest_priority_not_the_new_entry() {
        let mut q = SendQueue::new(2);
        q.push(QueuedPacket::new(20, packet(1)));
        q.push(QueuedPacket::new(20, packet(2)));
        q.push(QueuedPacket::new(23, packet(3)));

        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().unwrap().packet.header.src, 3);
        assert_eq!(q.pop().unwrap().packet.header.src, 2);
    }
}
