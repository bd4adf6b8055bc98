use super::*;

fn ep(a: u8, b: u8, c: u8, d: u8, port: u16) -> Endpoint {
    Endpoint::new(IPAddress::V4([a, b, c, d]), port)
}

#[test]
fn normalized_keys_merge_directions() {
    let client = ep(10, 0, 0, 1, 1111);
    let server = ep(10, 0, 0, 2, 80);

    let forward = FlowKey::normalized(client, server, Protocol::TCP);
    let reverse = FlowKey::normalized(server, client, Protocol::TCP);

    assert_eq!(forward, reverse);
    assert_eq!(forward.endpoints.first, client);
    assert_eq!(forward.endpoints.second, server);
}

#[test]
fn protocol_is_part_of_the_key() {
    let a = ep(10, 0, 0, 1, 5000);
    let b = ep(10, 0, 0, 2, 53);

    let tcp = FlowKey::normalized(a, b, Protocol::TCP);
    let udp = FlowKey::normalized(a, b, Protocol::UDP);

    assert_ne!(tcp, udp);
}

#[test]
fn endpoints_order_by_ip_then_port() {
    let low_ip = ep(10, 0, 0, 1, 9999);
    let high_ip = ep(10, 0, 0, 2, 1);
    assert!(low_ip < high_ip);

    let low_port = ep(10, 0, 0, 1, 80);
    let high_port = ep(10, 0, 0, 1, 443);
    assert!(low_port < high_port);

    let pair = FlowEndpoints::new(high_ip, low_ip);
    assert_eq!(pair.first, low_ip);
    assert_eq!(pair.second, high_ip);
}

#[test]
fn v4_addresses_order_before_v6() {
    let v4 = IPAddress::V4([255, 255, 255, 255]);
    let v6 = IPAddress::V6([0; 16]);
    assert!(v4 < v6);
}

#[test]
fn ip_display_renders_both_families() {
    assert_eq!(IPAddress::V4([192, 168, 1, 10]).to_string(), "192.168.1.10");

    let mut bytes = [0u8; 16];
    bytes[0] = 0xfe;
    bytes[1] = 0x80;
    bytes[15] = 0x01;
    assert_eq!(IPAddress::V6(bytes).to_string(), "fe80:0:0:0:0:0:0:1");
}

#[test]
fn new_records_start_empty_and_untouched() {
    let src = ep(10, 0, 0, 1, 1000);
    let dst = ep(10, 0, 0, 2, 443);
    let key = FlowKey::normalized(src, dst, Protocol::TCP);

    let record = FlowRecord::new(key, Protocol::TCP, src, dst, 7.5);

    assert_eq!(record.state, FlowState::New);
    assert_eq!(record.first_seen, 7.5);
    assert_eq!(record.last_seen, 7.5);
    assert_eq!(record.packet_count, 0);
    assert!(record.handshake_packets.is_empty());
    assert!(record.packets.is_empty());
    assert!(!record.completed_handshake());
    assert!(!record.is_terminal());
}

#[test]
fn record_display_follows_first_seen_direction() {
    let src = ep(10, 0, 0, 2, 443);
    let dst = ep(10, 0, 0, 1, 1000);
    let key = FlowKey::normalized(src, dst, Protocol::TCP);

    let record = FlowRecord::new(key, Protocol::TCP, src, dst, 0.0);

    // The normalized key orders endpoints, the record does not.
    assert_eq!(record.to_string(), "10.0.0.2:443 -> 10.0.0.1:1000");
}
