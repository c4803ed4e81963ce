use std::collections::HashMap;

use mesh_proto::NetworkNode;

use crate::duplicate::DuplicateCache;
use crate::etx;
use crate::route_node::RouteNode;
use crate::trigger::TriggerController;

/// Distance-vector routing table keyed by destination address (spec §4.2).
///
/// Bounded to `capacity` entries; admission and eviction both weigh total
/// ETX, with direct neighbours always preferred over multi-hop routes.
#[derive(Debug)]
pub struct RoutingTable {
    routes: HashMap<u16, RouteNode>,
    capacity: usize,
    local_addr: u16,
}

impl RoutingTable {
    pub fn new(local_addr: u16, capacity: usize) -> Self {
        Self {
            routes: HashMap::with_capacity(capacity.min(64)),
            capacity,
            local_addr,
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn find(&self, address: u16) -> Option<&RouteNode> {
        self.routes.get(&address)
    }

    /// Mutable access to a route's bookkeeping fields (e.g. RTT estimates)
    /// without going through the route-update policy in [`Self::process_route`].
    pub fn find_mut(&mut self, address: u16) -> Option<&mut RouteNode> {
        self.routes.get_mut(&address)
    }

    /// Next-hop address for `address`, or `0` (no route) — matches the
    /// original accessor's "0 means unknown" convention.
    pub fn next_hop(&self, address: u16) -> u16 {
        self.routes.get(&address).map(|r| r.via).unwrap_or(0)
    }

    pub fn all_network_nodes(&self) -> Vec<NetworkNode> {
        self.routes.values().map(|r| r.network_node.clone()).collect()
    }

    pub fn best_node_by_role(&self, role_mask: u8) -> Option<&RouteNode> {
        self.routes
            .values()
            .filter(|r| r.network_node.role & role_mask != 0)
            .min_by_key(|r| r.total_etx())
    }

    pub fn worst_route(&self) -> Option<&RouteNode> {
        self.routes.values().max_by_key(|r| r.total_etx())
    }

    /// Drops every route whose timeout has elapsed, invoking the
    /// trigger-update hook for each one (spec §4.5).
    pub fn manage_timeouts(&mut self, now_ms: u64, trigger: &mut TriggerController) {
        let expired: Vec<u16> = self
            .routes
            .iter()
            .filter(|(_, node)| node.timeout_ms < now_ms)
            .map(|(&addr, _)| addr)
            .collect();
        for addr in expired {
            self.routes.remove(&addr);
            tracing::debug!(addr, "route expired");
            trigger.on_route_changed(addr, now_ms);
        }
    }

    /// Advances the hello-sample counters for every direct neighbour ahead of
    /// assembling the next outgoing hello, decaying them once they grow large
    /// enough that the ratio would otherwise stop reacting to change (spec §4.2.4).
    pub fn update_expected_hellos(&mut self) {
        for node in self.routes.values_mut() {
            if node.network_node.hop_count != 1 {
                continue;
            }
            node.hellos_expected = node.hellos_expected.saturating_add(1);
            if node.hellos_expected >= etx::DECAY_THRESHOLD {
                node.hellos_expected = (node.hellos_expected as f32 * etx::DECAY_FACTOR) as u16;
                node.hellos_received = (node.hellos_received as f32 * etx::DECAY_FACTOR) as u16;
            }
        }
    }

    /// Folds one received hello into the table: direct-neighbour accounting,
    /// reverse/forward ETX estimation, and propagation of every route the
    /// sender advertised (spec §4.2.1). Returns `false` if the hello was a
    /// duplicate and was dropped without being processed.
    #[allow(clippy::too_many_arguments)]
    pub fn process_route(
        &mut self,
        hello_src: u16,
        hello_id: u8,
        advertised: &[NetworkNode],
        received_snr: i8,
        now_ms: u64,
        default_timeout_ms: u64,
        dup_cache: &mut DuplicateCache,
        trigger: &mut TriggerController,
    ) -> bool {
        if dup_cache.check_and_record(hello_src, hello_id, now_ms) {
            tracing::debug!(src = hello_src, id = hello_id, "duplicate hello dropped");
            return false;
        }

        let neighbour_exists = self
            .routes
            .get(&hello_src)
            .map(|n| n.is_direct())
            .unwrap_or(false);

        if neighbour_exists {
            let node = self.routes.get_mut(&hello_src).expect("checked above");
            node.hellos_received = node.hellos_received.saturating_add(1);
            node.timeout_ms = now_ms + default_timeout_ms;
        } else {
            self.try_insert(
                NetworkNode {
                    address: hello_src,
                    reverse_etx: etx::BOOTSTRAP,
                    forward_etx: etx::BOOTSTRAP,
                    role: 0,
                    hop_count: 1,
                },
                hello_src,
                now_ms,
                default_timeout_ms,
                trigger,
            );
            if let Some(node) = self.routes.get_mut(&hello_src) {
                node.hellos_expected = 1;
                node.hellos_received = 1;
            }
        }

        if let Some(node) = self.routes.get_mut(&hello_src) {
            node.received_snr = received_snr;
        }

        let sender_reverse_etx = self.update_reverse_etx(hello_src);
        let sender_forward_etx = advertised
            .iter()
            .find(|n| n.address == self.local_addr && n.hop_count == 1)
            .map(|n| n.reverse_etx)
            .unwrap_or(etx::BOOTSTRAP);
        if let Some(node) = self.routes.get_mut(&hello_src) {
            node.network_node.forward_etx = sender_forward_etx;
        }

        for candidate in advertised {
            if candidate.address == self.local_addr {
                continue;
            }
            let routed = NetworkNode {
                address: candidate.address,
                reverse_etx: candidate
                    .reverse_etx
                    .saturating_add(sender_reverse_etx)
                    .min(etx::MAX),
                forward_etx: candidate
                    .forward_etx
                    .saturating_add(sender_forward_etx)
                    .min(etx::MAX),
                role: candidate.role,
                hop_count: candidate.hop_count.saturating_add(1),
            };
            self.update_route(hello_src, routed, now_ms, default_timeout_ms, trigger);
        }

        true
    }

    /// Recomputes `hello_src`'s reverse ETX from its hello-delivery ratio
    /// once enough samples exist; otherwise leaves it at the bootstrap value.
    fn update_reverse_etx(&mut self, hello_src: u16) -> u8 {
        let Some(node) = self.routes.get(&hello_src) else {
            return etx::BOOTSTRAP;
        };
        if node.hellos_expected < etx::MIN_SAMPLES {
            return etx::BOOTSTRAP;
        }
        let ratio = node.hellos_received as f32 / node.hellos_expected as f32;
        let value = if ratio > 0.0 { (10.0 / ratio).round() } else { etx::MAX as f32 };
        let clamped = value.clamp(etx::MIN as f32, etx::MAX as f32) as u8;
        if let Some(node) = self.routes.get_mut(&hello_src) {
            node.network_node.reverse_etx = clamped;
        }
        clamped
    }

    /// Applies one advertised route: admits it if unknown, or re-evaluates
    /// it against the current route to the same destination with hysteresis
    /// (spec §4.2.2).
    fn update_route(
        &mut self,
        via: u16,
        candidate: NetworkNode,
        now_ms: u64,
        default_timeout_ms: u64,
        trigger: &mut TriggerController,
    ) {
        if candidate.address == self.local_addr {
            return;
        }
        let total_new = candidate.reverse_etx as u32 + candidate.forward_etx as u32;

        let Some(current) = self.routes.get(&candidate.address) else {
            self.try_insert(candidate, via, now_ms, default_timeout_ms, trigger);
            return;
        };
        let total_cur = current.total_etx();
        let improved = (total_new as f32) < (total_cur as f32) / etx::HYSTERESIS;
        let comparable = total_new as f32 <= total_cur as f32 * 1.05;

        let address = candidate.address;
        let node = self.routes.get_mut(&address).expect("checked above");
        if improved {
            node.network_node.reverse_etx = candidate.reverse_etx;
            node.network_node.forward_etx = candidate.forward_etx;
            node.network_node.hop_count = candidate.hop_count;
            node.via = via;
            node.timeout_ms = now_ms + default_timeout_ms;
            tracing::debug!(address, total_new, total_cur, "route improved");
            trigger.on_route_changed(address, now_ms);
        } else if comparable {
            node.timeout_ms = now_ms + default_timeout_ms;
        }

        let via_is_current = via == node.via;
        let candidate_is_direct = candidate.hop_count == 1 && via == candidate.address;
        if via_is_current || candidate_is_direct {
            node.network_node.role = candidate.role;
        }
    }

    /// Admits a brand-new route, subject to the acceptance ceiling and, if
    /// the table is full, eviction of the current worst route (spec §4.2.3).
    fn try_insert(
        &mut self,
        candidate: NetworkNode,
        via: u16,
        now_ms: u64,
        default_timeout_ms: u64,
        trigger: &mut TriggerController,
    ) {
        let candidate_total = candidate.reverse_etx as u32 + candidate.forward_etx as u32;
        let is_direct = candidate.hop_count == 1;

        if !is_direct {
            // The ceiling is judged against other multi-hop routes only: a
            // freshly bootstrapped direct neighbour's inflated ETX would
            // otherwise make the very first hop-2 route impossible to admit.
            let max_multi_hop_total = self
                .routes
                .values()
                .filter(|r| r.network_node.hop_count > 1)
                .map(|r| r.total_etx())
                .max();
            let ceiling = match max_multi_hop_total {
                Some(max_total) => max_total + etx::MIN as u32,
                None => etx::BOOTSTRAP_THRESHOLD as u32,
            };
            if candidate_total > ceiling {
                return;
            }
        }

        if self.routes.len() >= self.capacity {
            let worst = self.worst_route().map(|r| (r.network_node.address, r.total_etx()));
            match worst {
                Some((worst_addr, worst_total)) => {
                    let should_evict = candidate_total < worst_total.saturating_sub(etx::MIN as u32)
                        || worst_total > etx::UNUSABLE as u32;
                    if should_evict || is_direct {
                        self.routes.remove(&worst_addr);
                    } else {
                        return;
                    }
                }
                None => return,
            }
        }

        let address = candidate.address;
        self.routes.insert(
            address,
            RouteNode {
                network_node: candidate,
                via,
                timeout_ms: now_ms + default_timeout_ms,
                received_snr: 0,
                sent_snr: 0,
                srtt_ms: 0,
                rtt_var_ms: 0,
                hellos_expected: if is_direct { 1 } else { 0 },
                hellos_received: if is_direct { 1 } else { 0 },
            },
        );
        tracing::debug!(address, via, "route admitted");
        trigger.on_route_changed(address, now_ms);
    }
}
