use mesh_proto::NetworkNode;

/// A single entry of the routing table: an advertised [`NetworkNode`] plus
/// the local bookkeeping needed to maintain it (spec §3.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNode {
    pub network_node: NetworkNode,
    /// Next hop address; for a direct neighbour this equals `network_node.address`.
    pub via: u16,
    /// Absolute tick at which this route expires absent a refresh.
    pub timeout_ms: u64,
    pub received_snr: i8,
    pub sent_snr: i8,
    /// Smoothed round-trip time estimate, RFC 6298-style (spec §4.3.5).
    pub srtt_ms: u32,
    pub rtt_var_ms: u32,
    /// Hello-interval samples expected from this direct neighbour.
    pub hellos_expected: u16,
    /// Hello-interval samples actually received from this direct neighbour.
    pub hellos_received: u16,
}

impl RouteNode {
    pub fn total_etx(&self) -> u32 {
        self.network_node.reverse_etx as u32 + self.network_node.forward_etx as u32
    }

    pub fn is_direct(&self) -> bool {
        self.network_node.hop_count == 1 && self.via == self.network_node.address
    }

    pub fn has_rtt_estimate(&self) -> bool {
        self.srtt_ms != 0
    }
}
