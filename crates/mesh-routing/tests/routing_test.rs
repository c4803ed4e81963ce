use mesh_proto::NetworkNode;
use mesh_routing::{DuplicateCache, RoutingTable, TriggerController};

const DEFAULT_TIMEOUT_MS: u64 = 60_000;

fn node(address: u16, reverse_etx: u8, forward_etx: u8, role: u8, hop_count: u8) -> NetworkNode {
    NetworkNode {
        address,
        reverse_etx,
        forward_etx,
        role,
        hop_count,
    }
}

/// Exchanges enough bare hellos with `neighbour` that its measured reverse
/// ETX leaves the bootstrap value (spec §4.2: `MIN_SAMPLES` hello samples).
fn mature_neighbour(
    table: &mut RoutingTable,
    neighbour: u16,
    mut id: u8,
    mut now_ms: u64,
    dup: &mut DuplicateCache,
    trigger: &mut TriggerController,
) -> (u8, u64) {
    for _ in 0..3 {
        table.update_expected_hellos();
        table.process_route(neighbour, id, &[], -40, now_ms, DEFAULT_TIMEOUT_MS, dup, trigger);
        id = id.wrapping_add(1);
        now_ms += 1_000;
    }
    (id, now_ms)
}

/// Scenario 1: a bare hello from a new neighbour creates a direct route.
#[test]
fn two_node_hello_converges_to_direct_route() {
    let mut table = RoutingTable::new(0x0001, 32);
    let mut dup = DuplicateCache::new();
    let mut trigger = TriggerController::new();

    let processed = table.process_route(0x0002, 1, &[], -40, 0, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);
    assert!(processed);

    let route = table.find(0x0002).expect("direct route exists");
    assert_eq!(route.via, 0x0002);
    assert!(route.is_direct());
    assert_eq!(route.network_node.hop_count, 1);
    assert_eq!(table.next_hop(0x0002), 0x0002);
}

/// Scenario 2: once a neighbour's link has enough hello samples to leave
/// bootstrap ETX, a route it advertises should be learned at hop_count + 1.
#[test]
fn three_node_transitive_route_is_learned() {
    let mut table = RoutingTable::new(0x0001, 32);
    let mut dup = DuplicateCache::new();
    let mut trigger = TriggerController::new();

    let (id, now_ms) = mature_neighbour(&mut table, 0x0002, 1, 0, &mut dup, &mut trigger);

    // B's hello now advertises C as one of its own direct neighbours.
    let advertised = [node(0x0003, 12, 12, 0, 1)];
    table.process_route(0x0002, id, &advertised, -40, now_ms, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);

    let route = table.find(0x0003).expect("transitive route learned");
    assert_eq!(route.via, 0x0002);
    assert_eq!(route.network_node.hop_count, 2);
    assert_eq!(table.next_hop(0x0003), 0x0002);
}

/// Scenario 3: an alternate, only marginally better route must not displace
/// the current one — hysteresis requires a >10% improvement.
#[test]
fn hysteresis_keeps_current_route_on_marginal_improvement() {
    let mut table = RoutingTable::new(0x0001, 32);
    let mut dup = DuplicateCache::new();
    let mut trigger = TriggerController::new();

    table.process_route(0x0002, 1, &[node(0x0004, 10, 10, 0, 1)], -40, 0, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);
    let original_via = table.find(0x0004).unwrap().via;
    let original_total = table.find(0x0004).unwrap().total_etx();

    // A second, still-bootstrapping neighbour offers only a marginally
    // cheaper route.
    table.process_route(0x0003, 1, &[node(0x0004, 9, 9, 0, 1)], -40, 1_000, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);

    let route = table.find(0x0004).unwrap();
    assert_eq!(route.via, original_via, "marginal improvement must not win over hysteresis");
    assert_eq!(route.total_etx(), original_total);
}

/// Scenario 3b: a genuinely better route (beyond the hysteresis margin) does
/// win, once the better neighbour's own link has matured.
#[test]
fn hysteresis_allows_strong_improvement_to_win() {
    let mut table = RoutingTable::new(0x0001, 32);
    let mut dup = DuplicateCache::new();
    let mut trigger = TriggerController::new();

    table.process_route(0x0002, 1, &[node(0x0004, 10, 10, 0, 1)], -40, 0, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);
    let (id, now_ms) = mature_neighbour(&mut table, 0x0003, 1, 2_000, &mut dup, &mut trigger);

    table.process_route(0x0003, id, &[node(0x0004, 10, 10, 0, 1)], -40, now_ms, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);

    let route = table.find(0x0004).unwrap();
    assert_eq!(route.via, 0x0003, "a much cheaper route through a matured link should win");
}

/// Scenario 6: a duplicate hello (same source and id) within the TTL must
/// be dropped without affecting the table.
#[test]
fn duplicate_hello_is_dropped() {
    let mut table = RoutingTable::new(0x0001, 32);
    let mut dup = DuplicateCache::new();
    let mut trigger = TriggerController::new();

    assert!(table.process_route(0x0002, 9, &[], -40, 0, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger));
    let received_before = table.find(0x0002).unwrap().hellos_received;

    let processed_again = table.process_route(0x0002, 9, &[], -40, 10, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);
    assert!(!processed_again, "identical (source, id) pair must be treated as a duplicate");
    assert_eq!(table.find(0x0002).unwrap().hellos_received, received_before);
}

/// Scenario 6b: a route that is admitted and then improves again well
/// within the per-route cooldown window still updates the table, but the
/// second triggered update is suppressed.
#[test]
fn flapping_route_is_cooled_down() {
    let mut table = RoutingTable::new(0x0001, 32);
    let mut dup = DuplicateCache::new();
    let mut trigger = TriggerController::new();

    table.process_route(0x0002, 1, &[node(0x0005, 10, 10, 0, 1)], -40, 0, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);
    assert_eq!(table.find(0x0005).unwrap().via, 0x0002);

    let (id_c, now_c) = mature_neighbour(&mut table, 0x0003, 1, 1_000, &mut dup, &mut trigger);

    // A strong improvement, but only 4s after the route was first admitted
    // (well inside the 10s per-route cooldown).
    table.process_route(0x0003, id_c, &[node(0x0005, 10, 10, 0, 1)], -40, now_c, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);

    assert_eq!(table.find(0x0005).unwrap().via, 0x0003, "the table still adopts the better route");
    assert!(trigger.updates_suppressed.0 >= 1, "but the announcement is suppressed by the per-route cooldown");
}

#[test]
fn expired_routes_are_swept_and_report_a_trigger() {
    let mut table = RoutingTable::new(0x0001, 32);
    let mut dup = DuplicateCache::new();
    let mut trigger = TriggerController::new();

    table.process_route(0x0002, 1, &[], -40, 0, DEFAULT_TIMEOUT_MS, &mut dup, &mut trigger);
    assert_eq!(table.len(), 1);

    table.manage_timeouts(DEFAULT_TIMEOUT_MS + 1, &mut trigger);
    assert!(table.is_empty());
}
