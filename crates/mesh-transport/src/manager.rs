use std::collections::HashMap;
use std::num::Wrapping;

use mesh_proto::constants::type_bits;
use mesh_proto::{factory, Packet, BROADCAST};
use mesh_routing::RoutingTable;

use crate::error::TransportError;
use crate::sequence::{InboundSequence, OutboundSequence};
use crate::{rtt, timeout};

/// Falls back for a sequence whose destination has since left the routing
/// table entirely (route expired mid-transfer).
const FALLBACK_TIMEOUT_MS: u64 = 40_000;

/// Result of a [`TransportManager::manage_timeouts`] sweep.
#[derive(Debug, Default)]
pub struct TimeoutSweep {
    /// Packets that must be handed to the send queue at [`crate::priority::MAX_PRIORITY`].
    pub resends: Vec<Packet>,
    /// Destinations whose outbound sequence was abandoned after `MAX_TIMEOUTS` retries.
    pub failed_sends: Vec<u16>,
}

/// Owns every in-flight reliable sequence, both outbound (`Q_WSP`) and
/// inbound (`Q_WRP`), plus the monotonic id counters used to originate new
/// packets (spec §4.3).
#[derive(Debug)]
pub struct TransportManager {
    outbound: HashMap<(u16, u8), OutboundSequence>,
    inbound: HashMap<(u16, u8), InboundSequence>,
    next_seq_id: Wrapping<u8>,
    next_packet_id: Wrapping<u8>,
    pub sequences_completed: Wrapping<u32>,
    pub sequences_failed: Wrapping<u32>,
    pub duplicate_acks_discarded: Wrapping<u32>,
    pub out_of_order_fragments: Wrapping<u32>,
    pub destination_unreachable: Wrapping<u32>,
}

impl Default for TransportManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportManager {
    pub fn new() -> Self {
        Self {
            outbound: HashMap::new(),
            inbound: HashMap::new(),
            next_seq_id: Wrapping(0),
            next_packet_id: Wrapping(0),
            sequences_completed: Wrapping(0),
            sequences_failed: Wrapping(0),
            duplicate_acks_discarded: Wrapping(0),
            out_of_order_fragments: Wrapping(0),
            destination_unreachable: Wrapping(0),
        }
    }

    fn allocate_seq_id(&mut self) -> u8 {
        let id = self.next_seq_id.0;
        self.next_seq_id += Wrapping(1);
        id
    }

    fn allocate_packet_id(&mut self) -> u8 {
        let id = self.next_packet_id.0;
        self.next_packet_id += Wrapping(1);
        id
    }

    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }

    /// Opens a new reliable sequence and returns the SYNC packet to enqueue
    /// at `DEFAULT_PRIORITY` (spec §4.3 transport contract).
    pub fn send_reliable(
        &mut self,
        dest: u16,
        payload: Vec<u8>,
        local_addr: u16,
        routing: &RoutingTable,
        max_packet_size: usize,
        now_ms: u64,
    ) -> Result<Packet, TransportError> {
        if dest == BROADCAST {
            return Err(TransportError::BroadcastDestination);
        }
        if payload.is_empty() {
            return Err(TransportError::EmptyPayload);
        }
        let route = routing.find(dest).ok_or_else(|| {
            self.destination_unreachable += Wrapping(1);
            TransportError::DestinationUnreachable(dest)
        })?;
        let via = route.via;

        let chunk_size = mesh_proto::max_user_payload(type_bits::DATA_FRAGMENT, max_packet_size).max(1);
        let fragments: Vec<Vec<u8>> = payload.chunks(chunk_size).map(|c| c.to_vec()).collect();
        let num_packets = fragments.len() as u16;

        let seq_id = self.allocate_seq_id();
        let timeout_ms = timeout::initial_timeout_ms(route);
        self.outbound.insert(
            (dest, seq_id),
            OutboundSequence {
                dest,
                via,
                seq_id,
                num_packets,
                last_ack: 0,
                first_ack_received: false,
                n_timeouts: 0,
                fragments,
                timeout_at_ms: now_ms + timeout_ms,
                current_timeout_ms: timeout_ms,
                sent_at_ms: now_ms,
            },
        );

        let id = self.allocate_packet_id();
        tracing::debug!(dest, seq_id, num_packets, "opened reliable sequence");
        Ok(factory::sync(dest, local_addr, id, via, seq_id, num_packets, max_packet_size))
    }

    /// Processes an ACK for an outbound sequence. Returns the next fragment
    /// to send, if the sequence is not yet complete (spec §4.3.1).
    #[allow(clippy::too_many_arguments)]
    pub fn on_ack(
        &mut self,
        src: u16,
        seq_id: u8,
        number: u16,
        local_addr: u16,
        now_ms: u64,
        routing: &mut RoutingTable,
        max_packet_size: usize,
    ) -> Option<Packet> {
        let key = (src, seq_id);

        let outcome = {
            let seq = self.outbound.get_mut(&key)?;
            if number < seq.last_ack {
                None
            } else if number == seq.num_packets {
                Some(true)
            } else {
                seq.first_ack_received = true;
                seq.last_ack = number;
                Some(false)
            }
        };

        let done = match outcome {
            None => {
                self.duplicate_acks_discarded += Wrapping(1);
                return None;
            }
            Some(done) => done,
        };

        if done {
            self.outbound.remove(&key);
            self.sequences_completed += Wrapping(1);
            tracing::debug!(src, seq_id, "outbound sequence complete");
            return None;
        }

        let (dest, via, frag_idx, sample_ms) = {
            let seq = self.outbound.get(&key)?;
            (seq.dest, seq.via, number as usize, now_ms.saturating_sub(seq.sent_at_ms) as u32)
        };

        let new_timeout = routing.find_mut(dest).map(|route| {
            rtt::on_sample(route, sample_ms);
            timeout::initial_timeout_ms(route)
        });

        let fragment_payload = {
            let seq = self.outbound.get_mut(&key)?;
            if let Some(t) = new_timeout {
                seq.current_timeout_ms = t;
            }
            seq.timeout_at_ms = now_ms + seq.current_timeout_ms;
            seq.sent_at_ms = now_ms;
            seq.n_timeouts = 0;
            seq.fragments.get(frag_idx).cloned()
        };

        let payload = fragment_payload?;
        let id = self.allocate_packet_id();
        Some(factory::fragment(dest, local_addr, id, via, seq_id, number + 1, payload, max_packet_size))
    }

    /// Processes a LOST notification: re-sends the named fragment (spec §4.3.1).
    pub fn on_lost(
        &mut self,
        src: u16,
        seq_id: u8,
        number: u16,
        local_addr: u16,
        now_ms: u64,
        max_packet_size: usize,
    ) -> Option<Packet> {
        let key = (src, seq_id);
        let (dest, via, payload) = {
            let seq = self.outbound.get_mut(&key)?;
            seq.timeout_at_ms = now_ms + seq.current_timeout_ms;
            let frag_idx = (number.saturating_sub(1)) as usize;
            (seq.dest, seq.via, seq.fragments.get(frag_idx).cloned())
        };
        let payload = payload?;
        let id = self.allocate_packet_id();
        tracing::debug!(dest, seq_id, number, "resending lost fragment");
        Some(factory::fragment(dest, local_addr, id, via, seq_id, number, payload, max_packet_size))
    }

    /// Processes an inbound SYNC, creating the sequence if new and always
    /// (re-)acknowledging fragment 0 (spec §4.3.2).
    #[allow(clippy::too_many_arguments)]
    pub fn on_sync(
        &mut self,
        src: u16,
        via: u16,
        seq_id: u8,
        num_packets: u16,
        local_addr: u16,
        now_ms: u64,
        routing: &RoutingTable,
        max_packet_size: usize,
    ) -> Packet {
        let key = (src, seq_id);
        if !self.inbound.contains_key(&key) {
            let timeout_ms = routing.find(src).map(timeout::initial_timeout_ms).unwrap_or(FALLBACK_TIMEOUT_MS);
            self.inbound.insert(
                key,
                InboundSequence {
                    src,
                    via,
                    seq_id,
                    num_packets,
                    last_ack: 0,
                    fragments: Vec::with_capacity(num_packets as usize),
                    timeout_at_ms: now_ms + timeout_ms,
                    current_timeout_ms: timeout_ms,
                    n_timeouts: 0,
                    last_event_ms: now_ms,
                },
            );
            tracing::debug!(src, seq_id, num_packets, "opened inbound sequence");
        }
        let id = self.allocate_packet_id();
        factory::ack(src, local_addr, id, via, seq_id, 0, max_packet_size)
    }

    /// Processes a data fragment. Returns the control packet to send (an ACK
    /// for in-order delivery, a LOST for a gap) and, once the final fragment
    /// arrives, the fully reassembled payload (spec §4.3.2).
    #[allow(clippy::too_many_arguments)]
    pub fn on_fragment(
        &mut self,
        src: u16,
        seq_id: u8,
        number: u16,
        payload: Vec<u8>,
        local_addr: u16,
        now_ms: u64,
        routing: &mut RoutingTable,
        max_packet_size: usize,
    ) -> (Option<Packet>, Option<Vec<u8>>) {
        let key = (src, seq_id);
        let Some(seq) = self.inbound.get_mut(&key) else {
            tracing::debug!(src, seq_id, "fragment for unknown sequence dropped");
            return (None, None);
        };

        if number != seq.last_ack + 1 {
            self.out_of_order_fragments += Wrapping(1);
            let missing = seq.last_ack + 1;
            let via = seq.via;
            seq.timeout_at_ms = now_ms + seq.current_timeout_ms;
            let id = self.allocate_packet_id();
            return (
                Some(factory::lost(src, local_addr, id, via, seq_id, missing, max_packet_size)),
                None,
            );
        }

        seq.fragments.push(payload);
        seq.last_ack = number;
        let sample_ms = now_ms.saturating_sub(seq.last_event_ms) as u32;
        seq.last_event_ms = now_ms;
        let via = seq.via;
        let num_packets = seq.num_packets;

        if let Some(route) = routing.find_mut(src) {
            rtt::on_sample(route, sample_ms);
            let seq = self.inbound.get_mut(&key).expect("checked above");
            seq.current_timeout_ms = timeout::initial_timeout_ms(route);
        }
        let seq = self.inbound.get_mut(&key).expect("checked above");
        seq.timeout_at_ms = now_ms + seq.current_timeout_ms;
        seq.n_timeouts = 0;

        let id = self.allocate_packet_id();
        let ack_packet = factory::ack(src, local_addr, id, via, seq_id, number, max_packet_size);

        if number == num_packets {
            let seq = self.inbound.remove(&key).expect("checked above");
            let mut reassembled = Vec::with_capacity(seq.fragments.iter().map(|f| f.len()).sum());
            for fragment in seq.fragments {
                reassembled.extend(fragment);
            }
            self.sequences_completed += Wrapping(1);
            tracing::debug!(src, seq_id, "inbound sequence reassembled");
            (Some(ack_packet), Some(reassembled))
        } else {
            (Some(ack_packet), None)
        }
    }

    /// Walks both sequence tables, retransmitting anything past its timeout
    /// and abandoning sequences that exceed `MAX_TIMEOUTS` (spec §4.3.1, §4.3.2, §4.4.3).
    pub fn manage_timeouts(
        &mut self,
        now_ms: u64,
        local_addr: u16,
        routing: &RoutingTable,
        send_queue_len: usize,
        max_packet_size: usize,
    ) -> TimeoutSweep {
        let mut sweep = TimeoutSweep::default();

        let expired_out: Vec<(u16, u8)> = self
            .outbound
            .iter()
            .filter(|(_, s)| s.timeout_at_ms <= now_ms)
            .map(|(&k, _)| k)
            .collect();
        for key in expired_out {
            let should_abandon;
            let dest;
            let via;
            let seq_id;
            let num_packets;
            let first_ack_received;
            {
                let seq = self.outbound.get_mut(&key).expect("key from expired_out");
                seq.n_timeouts += 1;
                should_abandon = seq.n_timeouts >= timeout::MAX_TIMEOUTS;
                dest = seq.dest;
                via = seq.via;
                seq_id = seq.seq_id;
                num_packets = seq.num_packets;
                first_ack_received = seq.first_ack_received;
                if !should_abandon {
                    let new_timeout = match routing.find(dest) {
                        Some(route) => timeout::retry_timeout_ms(route, seq.current_timeout_ms, send_queue_len),
                        None => seq.current_timeout_ms.saturating_mul(2),
                    };
                    seq.current_timeout_ms = new_timeout;
                    seq.timeout_at_ms = now_ms + new_timeout;
                }
            }
            if should_abandon {
                self.outbound.remove(&key);
                self.sequences_failed += Wrapping(1);
                sweep.failed_sends.push(dest);
                tracing::warn!(dest, seq_id, "outbound sequence abandoned after max retries");
                continue;
            }
            if !first_ack_received {
                let id = self.allocate_packet_id();
                sweep
                    .resends
                    .push(factory::sync(dest, local_addr, id, via, seq_id, num_packets, max_packet_size));
            }
        }

        let expired_in: Vec<(u16, u8)> = self
            .inbound
            .iter()
            .filter(|(_, s)| s.timeout_at_ms <= now_ms)
            .map(|(&k, _)| k)
            .collect();
        for key in expired_in {
            let should_abandon;
            let src;
            let via;
            let seq_id;
            let missing;
            {
                let seq = self.inbound.get_mut(&key).expect("key from expired_in");
                seq.n_timeouts += 1;
                should_abandon = seq.n_timeouts >= timeout::MAX_TIMEOUTS;
                src = seq.src;
                via = seq.via;
                seq_id = seq.seq_id;
                missing = seq.last_ack + 1;
                if !should_abandon {
                    let new_timeout = match routing.find(src) {
                        Some(route) => timeout::retry_timeout_ms(route, seq.current_timeout_ms, send_queue_len),
                        None => seq.current_timeout_ms.saturating_mul(2),
                    };
                    seq.current_timeout_ms = new_timeout;
                    seq.timeout_at_ms = now_ms + new_timeout;
                }
            }
            if should_abandon {
                self.inbound.remove(&key);
                self.sequences_failed += Wrapping(1);
                tracing::warn!(src, seq_id, "inbound sequence abandoned after max retries");
                continue;
            }
            let id = self.allocate_packet_id();
            sweep
                .resends
                .push(factory::lost(src, local_addr, id, via, seq_id, missing, max_packet_size));
        }

        sweep
    }
}
