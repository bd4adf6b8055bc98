use super::render;
use crate::analyzer::analyze;
use crate::flow::{IPAddress, Protocol};
use crate::packet::{PacketRecord, TcpFlags};

const A: IPAddress = IPAddress::V4([10, 0, 0, 1]);
const B: IPAddress = IPAddress::V4([10, 0, 0, 2]);

fn tcp(ts: f64, src: (IPAddress, u16), dst: (IPAddress, u16), flags: TcpFlags) -> PacketRecord {
    PacketRecord {
        timestamp: ts,
        transport: Protocol::TCP,
        src_ip: Some(src.0),
        dst_ip: Some(dst.0),
        src_port: Some(src.1),
        dst_port: Some(dst.1),
        tcp_flags: Some(flags),
        length: 64,
        payload: Vec::new(),
    }
}

#[test]
fn report_lists_summary_and_flows() {
    let analysis = analyze(vec![
        tcp(1.0, (A, 1000), (B, 443), TcpFlags::SYN),
        tcp(1.1, (B, 443), (A, 1000), TcpFlags::ACK),
        tcp(1.2, (B, 443), (A, 1000), TcpFlags::PSH_ACK),
    ]);

    let report = render(&analysis);

    assert!(report.contains("Total packets: 3"));
    assert!(report.contains("TCP packets: 3"));
    assert!(report.contains("Failed transmissions: 0"));
    assert!(report.contains("10.0.0.1:1000 -> 10.0.0.2:443\n"));
    assert!(report.contains("handshake data:"));
    assert!(report.contains("TCP 10.0.0.2:443 -> 10.0.0.1:1000 [PSH+ACK] len=64"));
}

#[test]
fn report_annotates_unfinished_flows() {
    let analysis = analyze(vec![
        tcp(1.0, (A, 1000), (B, 443), TcpFlags::SYN),
        tcp(2.0, (A, 2000), (B, 443), TcpFlags::RST),
    ]);

    let report = render(&analysis);

    assert!(report.contains("10.0.0.1:1000 -> 10.0.0.2:443 (SYN)"));
    assert!(report.contains("10.0.0.1:2000 -> 10.0.0.2:443 (RST)"));
}

#[test]
fn report_renders_connection_tree_children() {
    const C: IPAddress = IPAddress::V4([10, 0, 0, 3]);
    let analysis = analyze(vec![
        tcp(1.0, (A, 1000), (B, 443), TcpFlags::SYN),
        tcp(1.1, (B, 443), (A, 1000), TcpFlags::ACK),
        tcp(2.0, (B, 9999), (C, 443), TcpFlags::SYN),
        tcp(2.1, (C, 443), (B, 9999), TcpFlags::ACK),
    ]);

    let report = render(&analysis);

    assert!(report.contains("Connection tree:"));
    assert!(report.contains("\n10.0.0.1:1000 -> 10.0.0.2:443\n  10.0.0.2:9999 -> 10.0.0.3:443"));
}
