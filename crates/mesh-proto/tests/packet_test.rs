use mesh_proto::{factory, network_node::NetworkNode, packet::Packet, type_bits, BROADCAST};

#[test]
fn hello_roundtrips() {
    let nodes = [
        NetworkNode {
            address: 0x0001,
            reverse_etx: 15,
            forward_etx: 15,
            role: 0,
            hop_count: 1,
        },
        NetworkNode {
            address: 0x0002,
            reverse_etx: 20,
            forward_etx: 18,
            role: 0x01,
            hop_count: 2,
        },
    ];
    let packet = factory::hello(0x0001, 7, &nodes, 100);
    let encoded = packet.encode();
    let decoded = Packet::decode(&encoded).expect("decode");
    assert_eq!(decoded, packet);
    assert_eq!(decoded.header.dst, BROADCAST);
    assert_eq!(decoded.header.kind, type_bits::HELLO);

    let recovered = NetworkNode::decode_all(&decoded.payload).expect("nodes");
    assert_eq!(&recovered, &nodes);
}

#[test]
fn data_roundtrips() {
    let packet = factory::data(0x0002, 0x0001, 3, 0x0002, vec![1, 2, 3, 4], 100);
    let encoded = packet.encode();
    let decoded = Packet::decode(&encoded).expect("decode");
    assert_eq!(decoded, packet);
    assert_eq!(decoded.via(), Some(0x0002));
    assert!(type_bits::is_only_data(decoded.kind()));
}

#[test]
fn sync_and_fragment_roundtrip() {
    let sync = factory::sync(0x0003, 0x0001, 0, 0x0002, 9, 3, 100);
    let encoded = sync.encode();
    let decoded = Packet::decode(&encoded).expect("decode");
    assert_eq!(decoded, sync);
    assert!(type_bits::is_sync(decoded.kind()));
    assert!(type_bits::is_xl(decoded.kind()));
    assert!(type_bits::is_need_ack(decoded.kind()));
    assert_eq!(decoded.control_sub.unwrap().number, 3);

    let frag = factory::fragment(0x0003, 0x0001, 1, 0x0002, 9, 2, vec![9; 40], 100);
    let encoded = frag.encode();
    let decoded = Packet::decode(&encoded).expect("decode");
    assert_eq!(decoded, frag);
    assert!(!type_bits::is_sync(decoded.kind()));
    assert!(type_bits::is_xl(decoded.kind()));
}

#[test]
fn ack_and_lost_roundtrip() {
    let ack = factory::ack(0x0001, 0x0003, 4, 0x0002, 9, 2, 100);
    let decoded = Packet::decode(&ack.encode()).expect("decode");
    assert!(type_bits::is_ack(decoded.kind()));
    assert_eq!(decoded.control_sub.unwrap().number, 2);

    let lost = factory::lost(0x0001, 0x0003, 5, 0x0002, 9, 2, 100);
    let decoded = Packet::decode(&lost.encode()).expect("decode");
    assert!(type_bits::is_lost(decoded.kind()));
}

#[test]
fn oversized_payload_is_truncated() {
    let huge = vec![0xAB; 500];
    let packet = factory::data(0x0002, 0x0001, 0, 0x0002, huge, 20);
    assert!(packet.total_size() <= 20);
    assert_eq!(packet.payload.len(), mesh_proto::max_user_payload(packet.kind(), 20));
}

#[test]
fn decode_rejects_truncated_frame() {
    let bytes = [0u8; 3];
    assert!(Packet::decode(&bytes).is_err());
}

#[test]
fn header_size_matches_type_bits() {
    assert_eq!(type_bits::header_size(type_bits::HELLO), 7);
    assert_eq!(type_bits::header_size(type_bits::DATA), 9);
    assert_eq!(type_bits::header_size(type_bits::ACK), 12);
    assert_eq!(type_bits::header_size(type_bits::SYNC_FRAGMENT), 12);
}
