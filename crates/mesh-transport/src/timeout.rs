use mesh_routing::RouteNode;

/// `HELLO_PACKETS_DELAY` from the routing layer, repeated here because the
/// RFC-6298-like timeout ceiling is expressed in terms of it (spec §4.3.4).
pub const HELLO_PACKETS_DELAY_S: u64 = 120;
pub const DEFAULT_TIMEOUT_S: u64 = HELLO_PACKETS_DELAY_S * 5;
pub const MIN_TIMEOUT_S: u64 = 20;
pub const MAX_TIMEOUTS: u8 = 10;

fn max_timeout_ms(hops: u8) -> u64 {
    DEFAULT_TIMEOUT_S * 1000 * hops.max(1) as u64
}

/// Timeout for a sequence's first send, before any RTT sample exists on the route.
pub fn initial_timeout_ms(route: &RouteNode) -> u64 {
    let hops = route.network_node.hop_count.max(1) as u64;
    if route.srtt_ms == 0 {
        10_000 * 4 + hops * 1000
    } else {
        let computed = route.srtt_ms as u64 + 4 * route.rtt_var_ms as u64;
        computed.clamp(MIN_TIMEOUT_S * 1000, max_timeout_ms(route.network_node.hop_count))
    }
}

/// Timeout recomputed after a retransmission, respecting the
/// `prev × 2 + send_queue_len × 3000` lower bound (spec §4.3.4).
pub fn retry_timeout_ms(route: &RouteNode, prev_timeout_ms: u64, send_queue_len: usize) -> u64 {
    let ceiling = max_timeout_ms(route.network_node.hop_count);
    let recomputed = initial_timeout_ms(route);
    let lower_bound = prev_timeout_ms.saturating_mul(2) + send_queue_len as u64 * 3000;
    recomputed.max(lower_bound).min(ceiling)
}
