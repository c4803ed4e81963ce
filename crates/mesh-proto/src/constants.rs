//! Fixed sizes and bit-field constants for the on-air wire format (spec §6.1).

/// Broadcast destination address.
pub const BROADCAST: u16 = 0xFFFF;

/// `dst:u16 | src:u16 | type:u8 | id:u8 | payload_size:u8`.
pub const BASE_HEADER_SIZE: usize = 7;
/// `via:u16`, present whenever [`type_bits::is_data`] holds.
pub const DATA_SUB_HEADER_SIZE: usize = 2;
/// `seq_id:u8 | number:u16`, present whenever [`type_bits::is_control`] holds.
pub const CONTROL_SUB_HEADER_SIZE: usize = 3;
/// `address:u16, reverse_etx:u8, forward_etx:u8, role:u8, hop_count:u8`.
pub const NETWORK_NODE_SIZE: usize = 6;

pub const MIN_MAX_PACKET_SIZE: usize = 13;
pub const MAX_MAX_PACKET_SIZE: usize = 255;
pub const DEFAULT_MAX_PACKET_SIZE: usize = 100;

/// Packet-type bit field (one octet). Bits encode orthogonal roles; the
/// canonical combinations are listed as named constants below.
pub mod type_bits {
    pub const HELLO_BIT: u8 = 0x04;
    pub const DATA_BIT: u8 = 0x02;
    pub const NEED_ACK_BIT: u8 = 0x01;
    pub const ACK_BIT: u8 = 0x08;
    pub const XL_BIT: u8 = 0x10;
    pub const LOST_BIT: u8 = 0x20;
    pub const SYNC_BIT: u8 = 0x40;

    /// Plain broadcast routing advertisement; payload is `NetworkNode[]`.
    pub const HELLO: u8 = HELLO_BIT;
    /// Plain data packet, no ACK/XL/LOST/SYNC control bits.
    pub const DATA: u8 = DATA_BIT;
    /// A fragment of a reliable transfer awaiting acknowledgment.
    pub const NEED_ACK: u8 = DATA_BIT | NEED_ACK_BIT;
    /// A fragment belonging to a multi-packet (large) payload.
    pub const XL_DATA: u8 = DATA_BIT | XL_BIT;
    /// Acknowledgment of a data fragment.
    pub const ACK: u8 = DATA_BIT | ACK_BIT;
    /// Negative-acknowledgment requesting resend of a fragment.
    pub const LOST: u8 = DATA_BIT | LOST_BIT;
    /// First packet of an outbound sequence; `number` carries the fragment count.
    pub const SYNC: u8 = DATA_BIT | SYNC_BIT;
    /// The SYNC packet that opens a reliable large-payload sequence (spec §4.3):
    /// `SYNC | NEED_ACK | XL_DATA` bits combined.
    pub const SYNC_FRAGMENT: u8 = DATA_BIT | SYNC_BIT | NEED_ACK_BIT | XL_BIT;
    /// A data fragment (index ≥ 1) of a reliable large-payload sequence:
    /// `NEED_ACK | XL_DATA` bits combined.
    pub const DATA_FRAGMENT: u8 = DATA_BIT | NEED_ACK_BIT | XL_BIT;

    pub const fn is_data(t: u8) -> bool {
        t & DATA_BIT != 0
    }

    pub const fn is_hello(t: u8) -> bool {
        t & HELLO_BIT != 0
    }

    pub const fn is_need_ack(t: u8) -> bool {
        t & NEED_ACK_BIT != 0
    }

    pub const fn is_ack(t: u8) -> bool {
        t & ACK_BIT != 0
    }

    pub const fn is_xl(t: u8) -> bool {
        t & XL_BIT != 0
    }

    pub const fn is_lost(t: u8) -> bool {
        t & LOST_BIT != 0
    }

    pub const fn is_sync(t: u8) -> bool {
        t & SYNC_BIT != 0
    }

    /// A data packet carrying none of the ACK/XL/LOST/SYNC control bits.
    pub const fn is_only_data(t: u8) -> bool {
        is_data(t) && !(is_need_ack(t) || is_ack(t) || is_xl(t) || is_lost(t) || is_sync(t))
    }

    /// Neither HELLO nor plain DATA: carries a control sub-header.
    pub const fn is_control(t: u8) -> bool {
        !is_hello(t) && !is_only_data(t)
    }

    /// Alias kept distinct from [`is_control`] for call sites that read more
    /// naturally as "does this data packet also carry a control sub-header".
    pub const fn is_data_control(t: u8) -> bool {
        is_data(t) && is_control(t)
    }

    /// Bytes of sub-header that follow the base header for this type.
    pub const fn extra_before_payload(t: u8) -> usize {
        let mut extra = 0usize;
        if is_data(t) {
            extra += super::DATA_SUB_HEADER_SIZE;
        }
        if is_control(t) {
            extra += super::CONTROL_SUB_HEADER_SIZE;
        }
        extra
    }

    /// Total header size (base header plus any sub-headers) for this type.
    pub const fn header_size(t: u8) -> usize {
        super::BASE_HEADER_SIZE + extra_before_payload(t)
    }
}
