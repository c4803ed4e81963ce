use thiserror::Error;

/// Errors raised while encoding or decoding wire frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("frame too short: {0} bytes (need at least {1})")]
    TooShort(usize, usize),
    #[error("payload of {0} bytes exceeds the {1}-byte budget for this packet type")]
    PayloadTooLarge(usize, usize),
    #[error("unrecognised packet type octet: 0x{0:02x}")]
    UnknownType(u8),
    #[error("total frame size {0} exceeds max_packet_size {1}")]
    FrameTooLarge(usize, usize),
    #[error("hello payload length {0} is not a multiple of the NetworkNode record size ({1})")]
    MalformedHelloPayload(usize, usize),
    #[error("max_packet_size {0} is outside the valid range [{1}, {2}]")]
    InvalidMaxPacketSize(usize, usize, usize),
}
