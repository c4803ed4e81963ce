use crate::constants::{BASE_HEADER_SIZE, CONTROL_SUB_HEADER_SIZE, DATA_SUB_HEADER_SIZE};
use crate::error::PacketError;

/// The base header common to every packet: `dst | src | type | id | payload_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub dst: u16,
    pub src: u16,
    pub kind: u8,
    pub id: u8,
    pub payload_size: u8,
}

impl Header {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.dst.to_le_bytes());
        buf.extend_from_slice(&self.src.to_le_bytes());
        buf.push(self.kind);
        buf.push(self.id);
        buf.push(self.payload_size);
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < BASE_HEADER_SIZE {
            return Err(PacketError::TooShort(bytes.len(), BASE_HEADER_SIZE));
        }
        Ok(Self {
            dst: u16::from_le_bytes([bytes[0], bytes[1]]),
            src: u16::from_le_bytes([bytes[2], bytes[3]]),
            kind: bytes[4],
            id: bytes[5],
            payload_size: bytes[6],
        })
    }
}

/// The `via` sub-header present on every data-bearing packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSub {
    pub via: u16,
}

impl DataSub {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.via.to_le_bytes());
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < DATA_SUB_HEADER_SIZE {
            return Err(PacketError::TooShort(bytes.len(), DATA_SUB_HEADER_SIZE));
        }
        Ok(Self {
            via: u16::from_le_bytes([bytes[0], bytes[1]]),
        })
    }
}

/// The `seq_id | number` sub-header present on control (reliable/SYNC/ACK/LOST) packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSub {
    pub seq_id: u8,
    pub number: u16,
}

impl ControlSub {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.seq_id);
        buf.extend_from_slice(&self.number.to_le_bytes());
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < CONTROL_SUB_HEADER_SIZE {
            return Err(PacketError::TooShort(bytes.len(), CONTROL_SUB_HEADER_SIZE));
        }
        Ok(Self {
            seq_id: bytes[0],
            number: u16::from_le_bytes([bytes[1], bytes[2]]),
        })
    }
}
