use crate::constants::NETWORK_NODE_SIZE;
use crate::error::PacketError;

/// One routing-table entry as advertised in a hello's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkNode {
    pub address: u16,
    /// Scaled ETX (value × 10), range `[10, 255]`.
    pub reverse_etx: u8,
    /// Scaled ETX (value × 10), range `[10, 255]`.
    pub forward_etx: u8,
    pub role: u8,
    pub hop_count: u8,
}

impl NetworkNode {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.address.to_le_bytes());
        buf.push(self.reverse_etx);
        buf.push(self.forward_etx);
        buf.push(self.role);
        buf.push(self.hop_count);
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < NETWORK_NODE_SIZE {
            return Err(PacketError::TooShort(bytes.len(), NETWORK_NODE_SIZE));
        }
        Ok(Self {
            address: u16::from_le_bytes([bytes[0], bytes[1]]),
            reverse_etx: bytes[2],
            forward_etx: bytes[3],
            role: bytes[4],
            hop_count: bytes[5],
        })
    }

    /// Encodes a contiguous sequence of nodes (a hello payload).
    pub fn encode_all(nodes: &[NetworkNode]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(nodes.len() * NETWORK_NODE_SIZE);
        for node in nodes {
            node.encode(&mut buf);
        }
        buf
    }

    /// Decodes a contiguous sequence of nodes (a hello payload).
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<NetworkNode>, PacketError> {
        if bytes.len() % NETWORK_NODE_SIZE != 0 {
            return Err(PacketError::MalformedHelloPayload(
                bytes.len(),
                NETWORK_NODE_SIZE,
            ));
        }
        bytes
            .chunks_exact(NETWORK_NODE_SIZE)
            .map(NetworkNode::decode)
            .collect()
    }
}
