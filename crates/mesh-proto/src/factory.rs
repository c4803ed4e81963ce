//! Centralizes construction of every packet kind so call sites never
//! hand-assemble a `Packet` directly (spec §2.2, "Packet factory helpers").

use crate::constants::{type_bits, BROADCAST};
use crate::header::ControlSub;
use crate::network_node::NetworkNode;
use crate::packet::Packet;

/// Builds a broadcast hello whose payload is the caller's current routing
/// view. Setting the local node's role in each [`NetworkNode`] is the
/// caller's responsibility (spec §4.1).
pub fn hello(local_addr: u16, id: u8, nodes: &[NetworkNode], max_packet_size: usize) -> Packet {
    let payload = NetworkNode::encode_all(nodes);
    Packet::new(
        BROADCAST,
        local_addr,
        type_bits::HELLO,
        id,
        None,
        None,
        payload,
        max_packet_size,
    )
}

/// A plain, best-effort data packet (no ACK/retransmission semantics).
pub fn data(
    dst: u16,
    src: u16,
    id: u8,
    via: u16,
    payload: Vec<u8>,
    max_packet_size: usize,
) -> Packet {
    Packet::new(
        dst,
        src,
        type_bits::DATA,
        id,
        Some(via),
        None,
        payload,
        max_packet_size,
    )
}

/// The SYNC packet that opens a reliable sequence; `number` carries the total
/// fragment count (spec §4.3).
pub fn sync(
    dst: u16,
    src: u16,
    id: u8,
    via: u16,
    seq_id: u8,
    num_fragments: u16,
    max_packet_size: usize,
) -> Packet {
    Packet::new(
        dst,
        src,
        type_bits::SYNC_FRAGMENT,
        id,
        Some(via),
        Some(ControlSub {
            seq_id,
            number: num_fragments,
        }),
        Vec::new(),
        max_packet_size,
    )
}

/// One 1-based fragment of a reliable sequence.
pub fn fragment(
    dst: u16,
    src: u16,
    id: u8,
    via: u16,
    seq_id: u8,
    number: u16,
    payload: Vec<u8>,
    max_packet_size: usize,
) -> Packet {
    Packet::new(
        dst,
        src,
        type_bits::DATA_FRAGMENT,
        id,
        Some(via),
        Some(ControlSub { seq_id, number }),
        payload,
        max_packet_size,
    )
}

/// Acknowledges fragment `number` of sequence `seq_id`.
pub fn ack(
    dst: u16,
    src: u16,
    id: u8,
    via: u16,
    seq_id: u8,
    number: u16,
    max_packet_size: usize,
) -> Packet {
    Packet::new(
        dst,
        src,
        type_bits::ACK,
        id,
        Some(via),
        Some(ControlSub { seq_id, number }),
        Vec::new(),
        max_packet_size,
    )
}

/// Requests resend of the missing fragment `number` of sequence `seq_id`.
pub fn lost(
    dst: u16,
    src: u16,
    id: u8,
    via: u16,
    seq_id: u8,
    number: u16,
    max_packet_size: usize,
) -> Packet {
    Packet::new(
        dst,
        src,
        type_bits::LOST,
        id,
        Some(via),
        Some(ControlSub { seq_id, number }),
        Vec::new(),
        max_packet_size,
    )
}

/// Re-addresses a packet to a new next hop for forwarding, leaving
/// `dst`/`src`/`id` untouched (the packet is not re-originated).
pub fn forward(mut packet: Packet, next_hop: u16) -> Packet {
    if let Some(data_sub) = packet.data_sub.as_mut() {
        data_sub.via = next_hop;
    }
    packet
}
