use super::decoder::decode_frame;
use crate::flow::{IPAddress, Protocol};
use etherparse::PacketBuilder;

fn serialize(builder: etherparse::PacketBuilderStep<etherparse::TcpHeader>, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).expect("serialize frame");
    frame
}

#[test]
fn decodes_tcp_syn_frame() {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
        .tcp(1000, 443, 0, 64240)
        .syn();
    let frame = serialize(builder, &[]);

    let record = decode_frame(1.5, &frame);

    assert_eq!(record.transport, Protocol::TCP);
    assert_eq!(record.src_ip, Some(IPAddress::V4([10, 0, 0, 1])));
    assert_eq!(record.dst_ip, Some(IPAddress::V4([10, 0, 0, 2])));
    assert_eq!(record.src_port, Some(1000));
    assert_eq!(record.dst_port, Some(443));
    let flags = record.tcp_flags.expect("tcp flags");
    assert!(flags.syn && !flags.ack && !flags.rst && !flags.fin && !flags.psh);
    assert_eq!(record.timestamp, 1.5);
    assert!(record.payload.is_empty());
}

#[test]
fn decodes_tcp_psh_ack_payload() {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([10, 0, 0, 2], [10, 0, 0, 1], 64)
        .tcp(443, 1000, 10, 64240)
        .ack(1)
        .psh();
    let payload = b"\x16\x03\x01\x00\x05hello";
    let frame = serialize(builder, payload);

    let record = decode_frame(2.0, &frame);

    let flags = record.tcp_flags.expect("tcp flags");
    assert!(flags.psh && flags.ack && !flags.syn);
    assert_eq!(record.payload, payload.to_vec());
}

#[test]
fn decodes_udp_frame() {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([192, 168, 1, 10], [192, 168, 1, 1], 64)
        .udp(5353, 53);
    let payload = b"query";
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).expect("serialize frame");

    let record = decode_frame(3.0, &frame);

    assert_eq!(record.transport, Protocol::UDP);
    assert_eq!(record.src_port, Some(5353));
    assert_eq!(record.dst_port, Some(53));
    assert!(record.tcp_flags.is_none());
    assert_eq!(record.payload, payload.to_vec());
}

#[test]
fn decodes_icmp_as_other_traffic() {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
        .icmpv4_echo_request(1, 1);
    let payload = b"ping";
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).expect("serialize frame");

    let record = decode_frame(4.0, &frame);

    assert_eq!(record.transport, Protocol::Other(1));
    assert_eq!(record.src_ip, Some(IPAddress::V4([10, 0, 0, 1])));
    assert!(record.src_port.is_none());
    assert!(record.tcp_flags.is_none());
}

#[test]
fn undecodable_frame_keeps_raw_bytes() {
    let garbage = [0x01u8, 0x02, 0x03];

    let record = decode_frame(5.0, &garbage);

    assert_eq!(record.transport, Protocol::Other(0));
    assert!(record.src_ip.is_none());
    assert!(record.dst_ip.is_none());
    assert_eq!(record.payload, garbage.to_vec());
    assert_eq!(record.length, 3);
}
