use mesh_routing::RouteNode;

/// Folds one RTT sample into a route's smoothed estimate, RFC 6298-style
/// with α = 1/8 and β = 1/4 expressed as integer division (spec §4.3.5).
///
/// Distinct from a floating-point/`Duration` estimator: both `srtt_ms` and
/// `rtt_var_ms` live on the route itself, so every sequence to that
/// destination shares one estimate instead of keeping a per-session one.
pub fn on_sample(route: &mut RouteNode, sample_ms: u32) {
    if route.srtt_ms == 0 {
        route.srtt_ms = sample_ms;
        route.rtt_var_ms = sample_ms / 2;
        return;
    }
    let diff = (route.srtt_ms as i64 - sample_ms as i64).unsigned_abs() as u32;
    route.rtt_var_ms = (3 * route.rtt_var_ms + diff) / 4;
    route.srtt_ms = (7 * route.srtt_ms + sample_ms as u32) / 8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_proto::NetworkNode;

    fn route() -> RouteNode {
        RouteNode {
            network_node: NetworkNode {
                address: 2,
                reverse_etx: 10,
                forward_etx: 10,
                role: 0,
                hop_count: 1,
            },
            via: 2,
            timeout_ms: 0,
            received_snr: 0,
            sent_snr: 0,
            srtt_ms: 0,
            rtt_var_ms: 0,
            hellos_expected: 0,
            hellos_received: 0,
        }
    }

    #[test]
    fn first_sample_seeds_srtt_and_half_variance() {
        let mut r = route();
        on_sample(&mut r, 200);
        assert_eq!(r.srtt_ms, 200);
        assert_eq!(r.rtt_var_ms, 100);
    }

    #[test]
    fn subsequent_sample_applies_weighted_update() {
        let mut r = route();
        on_sample(&mut r, 200);
        on_sample(&mut r, 240);
        assert_eq!(r.srtt_ms, (7 * 200 + 240) / 8);
        assert_eq!(r.rtt_var_ms, (3 * 100 + 40) / 4);
    }
}
