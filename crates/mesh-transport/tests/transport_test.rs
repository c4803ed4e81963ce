use mesh_proto::constants::type_bits;
use mesh_routing::RoutingTable;
use mesh_transport::TransportManager;

const MAX_PACKET_SIZE: usize = 100;

/// Scenario 4: a 250-byte payload fragments into three pieces and a SYNC,
/// and is fully acknowledged in order.
#[test]
fn reliable_three_fragment_send_completes() {
    let mut a_table = RoutingTable::new(0x0001, 32);
    // Direct route to C for the purposes of this unit: `process_route`
    // models a direct neighbour, so address C is reached directly here.
    a_table.process_route(0x0003, 1, &[], -40, 0, 60_000, &mut mesh_routing::DuplicateCache::new(), &mut mesh_routing::TriggerController::new());

    let mut a = TransportManager::new();
    let payload = vec![0xABu8; 250];
    let sync = a
        .send_reliable(0x0003, payload.clone(), 0x0001, &a_table, MAX_PACKET_SIZE, 0)
        .expect("route exists");
    assert!(type_bits::is_sync(sync.kind()));
    let num_fragments = sync.control_sub.unwrap().number;
    assert_eq!(num_fragments, 3, "90-byte chunks of a 250-byte payload need 3 fragments");

    // C's side: receive the SYNC, then the three fragments in order.
    let mut c_table = RoutingTable::new(0x0003, 32);
    let mut c = TransportManager::new();
    let ack0 = c.on_sync(0x0001, 0x0001, sync.control_sub.unwrap().seq_id, num_fragments, 0x0003, 0, &c_table, MAX_PACKET_SIZE);
    assert_eq!(ack0.control_sub.unwrap().number, 0);

    // A processes ACK 0, gets fragment 1 to send.
    let frag1 = a
        .on_ack(0x0003, sync.control_sub.unwrap().seq_id, 0, 0x0001, 10, &mut a_table, MAX_PACKET_SIZE)
        .expect("fragment 1 follows ack 0");
    assert_eq!(frag1.control_sub.unwrap().number, 1);

    let (ack1, done1) = c.on_fragment(0x0001, sync.control_sub.unwrap().seq_id, 1, frag1.payload.clone(), 0x0003, 20, &mut c_table, MAX_PACKET_SIZE);
    assert!(done1.is_none());
    assert_eq!(ack1.unwrap().control_sub.unwrap().number, 1);

    let frag2 = a.on_ack(0x0003, sync.control_sub.unwrap().seq_id, 1, 0x0001, 30, &mut a_table, MAX_PACKET_SIZE).unwrap();
    let (ack2, done2) = c.on_fragment(0x0001, sync.control_sub.unwrap().seq_id, 2, frag2.payload.clone(), 0x0003, 40, &mut c_table, MAX_PACKET_SIZE);
    assert!(ack2.is_some());
    assert!(done2.is_none());

    let frag3 = a.on_ack(0x0003, sync.control_sub.unwrap().seq_id, 2, 0x0001, 50, &mut a_table, MAX_PACKET_SIZE).unwrap();
    let (ack3, done3) = c.on_fragment(0x0001, sync.control_sub.unwrap().seq_id, 3, frag3.payload.clone(), 0x0003, 60, &mut c_table, MAX_PACKET_SIZE);
    assert!(ack3.is_some());
    let reassembled = done3.expect("final fragment reassembles the message");
    assert_eq!(reassembled, payload);
    assert_eq!(c.inbound_len(), 0, "sequence is freed once reassembled");

    // A's side completes once the final ACK (number == num_packets) arrives.
    assert!(a.on_ack(0x0003, sync.control_sub.unwrap().seq_id, 3, 0x0001, 70, &mut a_table, MAX_PACKET_SIZE).is_none());
    assert_eq!(a.outbound_len(), 0);
}

/// Scenario 5: C misses fragment 2 and emits a LOST; A resends it and
/// delivery completes.
#[test]
fn lost_fragment_is_recovered() {
    let mut a_table = RoutingTable::new(0x0001, 32);
    a_table.process_route(0x0003, 1, &[], -40, 0, 60_000, &mut mesh_routing::DuplicateCache::new(), &mut mesh_routing::TriggerController::new());
    let mut a = TransportManager::new();
    let payload = vec![0x11u8; 250];
    let sync = a.send_reliable(0x0003, payload.clone(), 0x0001, &a_table, MAX_PACKET_SIZE, 0).unwrap();
    let seq_id = sync.control_sub.unwrap().seq_id;
    let num_fragments = sync.control_sub.unwrap().number;

    let mut c_table = RoutingTable::new(0x0003, 32);
    let mut c = TransportManager::new();
    c.on_sync(0x0001, 0x0001, seq_id, num_fragments, 0x0003, 0, &c_table, MAX_PACKET_SIZE);
    let frag1 = a.on_ack(0x0003, seq_id, 0, 0x0001, 10, &mut a_table, MAX_PACKET_SIZE).unwrap();
    c.on_fragment(0x0001, seq_id, 1, frag1.payload.clone(), 0x0003, 20, &mut c_table, MAX_PACKET_SIZE);

    // Fragment 2 is lost in transit; C next sees fragment 3.
    let frag3_payload = vec![0x11u8; 70];
    let (lost, reassembled) = c.on_fragment(0x0001, seq_id, 3, frag3_payload, 0x0003, 30, &mut c_table, MAX_PACKET_SIZE);
    let lost = lost.expect("gap produces a LOST");
    assert!(type_bits::is_lost(lost.kind()));
    assert_eq!(lost.control_sub.unwrap().number, 2, "LOST names the missing fragment");
    assert!(reassembled.is_none());

    // A retransmits fragment 2 on the LOST.
    let resent = a.on_lost(0x0003, seq_id, 2, 0x0001, 40, MAX_PACKET_SIZE).expect("fragment still buffered");
    assert_eq!(resent.control_sub.unwrap().number, 2);

    let (ack2, done2) = c.on_fragment(0x0001, seq_id, 2, resent.payload.clone(), 0x0003, 50, &mut c_table, MAX_PACKET_SIZE);
    assert!(ack2.is_some());
    assert!(done2.is_none(), "fragment 3 was already buffered but out of order at the time");
}

/// `num_packets == 1`: a short reliable payload still exchanges a SYNC and
/// exactly one data ACK before reaching the application.
#[test]
fn single_fragment_payload_still_syncs() {
    let mut a_table = RoutingTable::new(0x0001, 32);
    a_table.process_route(0x0002, 1, &[], -40, 0, 60_000, &mut mesh_routing::DuplicateCache::new(), &mut mesh_routing::TriggerController::new());
    let mut a = TransportManager::new();
    let payload = vec![0x42u8; 10];
    let sync = a.send_reliable(0x0002, payload.clone(), 0x0001, &a_table, MAX_PACKET_SIZE, 0).unwrap();
    assert_eq!(sync.control_sub.unwrap().number, 1);

    let mut b_table = RoutingTable::new(0x0002, 32);
    let mut b = TransportManager::new();
    let seq_id = sync.control_sub.unwrap().seq_id;
    b.on_sync(0x0001, 0x0001, seq_id, 1, 0x0002, 0, &b_table, MAX_PACKET_SIZE);
    let frag1 = a.on_ack(0x0002, seq_id, 0, 0x0001, 10, &mut a_table, MAX_PACKET_SIZE).unwrap();
    let (ack, reassembled) = b.on_fragment(0x0001, seq_id, 1, frag1.payload.clone(), 0x0002, 20, &mut b_table, MAX_PACKET_SIZE);
    assert!(ack.is_some());
    assert_eq!(reassembled.unwrap(), payload);
}

/// Empty payloads and broadcast destinations are rejected before any
/// sequence is opened.
#[test]
fn send_reliable_rejects_broadcast_and_empty_payload() {
    let table = RoutingTable::new(0x0001, 32);
    let mut a = TransportManager::new();
    assert!(a.send_reliable(mesh_proto::BROADCAST, vec![1], 0x0001, &table, MAX_PACKET_SIZE, 0).is_err());
    assert!(a.send_reliable(0x0002, Vec::new(), 0x0001, &table, MAX_PACKET_SIZE, 0).is_err());
    assert!(a.send_reliable(0x0002, vec![1], 0x0001, &table, MAX_PACKET_SIZE, 0).is_err(), "no route yet");
}
