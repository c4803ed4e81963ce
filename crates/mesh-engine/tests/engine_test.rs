//! End-to-end tests driving real scheduler threads over an in-memory radio
//! (spec §8's concrete scenarios, exercised at the full-engine level rather
//! than unit-by-unit as in `mesh-routing`/`mesh-transport`).

use std::sync::Arc;
use std::time::{Duration, Instant};

use mesh_engine::{Engine, EngineConfig, Ether, StdPlatform};

/// Short intervals so convergence and reliable delivery fit in a few real
/// seconds of wall-clock time instead of the production defaults (120 s
/// hello interval, 600 s default timeout).
fn fast_config() -> EngineConfig {
    EngineConfig {
        hello_interval_s: 1,
        default_timeout_s: 6,
        min_timeout_s: 1,
        max_packet_size: 80,
        ..EngineConfig::default()
    }
}

fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    loop {
        if check() {
            return true;
        }
        if start.elapsed() >= timeout {
            return check();
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn two_nodes_learn_direct_routes_via_hello() {
    let ether = Ether::new();
    let radio_a = Ether::register(&ether, 1);
    let radio_b = Ether::register(&ether, 2);

    let engine_a = Engine::new(fast_config(), Arc::new(StdPlatform::with_unique_id(1)), Arc::new(radio_a)).unwrap();
    let engine_b = Engine::new(fast_config(), Arc::new(StdPlatform::with_unique_id(2)), Arc::new(radio_b)).unwrap();

    assert_eq!(engine_a.local_address(), 1);
    assert_eq!(engine_b.local_address(), 2);

    engine_a.start().unwrap();
    engine_b.start().unwrap();

    let converged = wait_until(Duration::from_secs(5), || {
        engine_a.routing_table_size() >= 1 && engine_b.routing_table_size() >= 1
    });
    assert!(converged, "nodes did not learn each other via hello");

    engine_a.standby().unwrap();
    engine_b.standby().unwrap();
}

#[test]
fn best_effort_send_reaches_a_direct_neighbour() {
    let ether = Ether::new();
    let radio_a = Ether::register(&ether, 10);
    let radio_b = Ether::register(&ether, 20);

    let engine_a = Engine::new(fast_config(), Arc::new(StdPlatform::with_unique_id(10)), Arc::new(radio_a)).unwrap();
    let engine_b = Engine::new(fast_config(), Arc::new(StdPlatform::with_unique_id(20)), Arc::new(radio_b)).unwrap();

    engine_a.start().unwrap();
    engine_b.start().unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        engine_a.routing_table_size() >= 1 && engine_b.routing_table_size() >= 1
    }));

    engine_a.send_data(20, b"hello mesh".to_vec()).unwrap();

    let delivered = wait_until(Duration::from_secs(5), || engine_b.received_queue_size() >= 1);
    assert!(delivered, "best-effort data never arrived");

    let packet = engine_b.next_app_packet().expect("queued packet");
    assert_eq!(packet.src, 10);
    assert_eq!(packet.payload, b"hello mesh");

    engine_a.standby().unwrap();
    engine_b.standby().unwrap();
}

#[test]
fn reliable_send_reassembles_a_multi_fragment_payload() {
    let ether = Ether::new();
    let radio_a = Ether::register(&ether, 100);
    let radio_b = Ether::register(&ether, 200);

    let engine_a = Engine::new(fast_config(), Arc::new(StdPlatform::with_unique_id(100)), Arc::new(radio_a)).unwrap();
    let engine_b = Engine::new(fast_config(), Arc::new(StdPlatform::with_unique_id(200)), Arc::new(radio_b)).unwrap();

    engine_a.start().unwrap();
    engine_b.start().unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        engine_a.routing_table_size() >= 1 && engine_b.routing_table_size() >= 1
    }));

    let payload: Vec<u8> = (0u8..200).collect();
    engine_a.send_reliable(200, payload.clone()).unwrap();

    let delivered = wait_until(Duration::from_secs(10), || engine_b.received_queue_size() >= 1);
    assert!(delivered, "reliable payload never reassembled");

    let packet = engine_b.next_app_packet().expect("queued packet");
    assert_eq!(packet.src, 100);
    assert_eq!(packet.payload, payload);

    engine_a.standby().unwrap();
    engine_b.standby().unwrap();
}

#[test]
fn send_reliable_to_unknown_destination_is_rejected() {
    let ether = Ether::new();
    let radio = Ether::register(&ether, 1);
    let engine = Engine::new(fast_config(), Arc::new(StdPlatform::with_unique_id(1)), Arc::new(radio)).unwrap();
    engine.start().unwrap();

    assert!(engine.send_reliable(9999, vec![1, 2, 3]).is_err());

    engine.standby().unwrap();
}

#[test]
fn config_validation_is_enforced_at_construction() {
    let ether = Ether::new();
    let radio = Ether::register(&ether, 1);
    let mut bad = EngineConfig::default();
    bad.duty_cycle_pct = 0;
    let result = Engine::new(bad, Arc::new(StdPlatform::with_unique_id(1)), Arc::new(radio));
    assert!(result.is_err());
}
