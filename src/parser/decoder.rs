use crate::flow::{IPAddress, Protocol};
use crate::packet::{PacketRecord, TcpFlags};
use etherparse::{NetHeaders, PacketHeaders, TransportHeader};
use tracing::trace;

/// Decode one link-layer frame into a record. Never fails: a frame that
/// does not parse as ethernet keeps its bytes as an opaque payload.
pub fn decode_frame(timestamp: f64, frame: &[u8]) -> PacketRecord {
    let length = u32::try_from(frame.len()).unwrap_or(u32::MAX);

    let headers = match PacketHeaders::from_ethernet_slice(frame) {
        Ok(headers) => headers,
        Err(err) => {
            trace!(error = ?err, "Frame did not decode; keeping raw bytes");
            return PacketRecord {
                timestamp,
                transport: Protocol::Other(0),
                src_ip: None,
                dst_ip: None,
                src_port: None,
                dst_port: None,
                tcp_flags: None,
                length,
                payload: frame.to_vec(),
            };
        }
    };

    let (src_ip, dst_ip, ip_proto) = match &headers.net {
        Some(NetHeaders::Ipv4(ip, _)) => (
            Some(IPAddress::V4(ip.source)),
            Some(IPAddress::V4(ip.destination)),
            ip.protocol.0,
        ),
        Some(NetHeaders::Ipv6(ip, _)) => (
            Some(IPAddress::V6(ip.source)),
            Some(IPAddress::V6(ip.destination)),
            ip.next_header.0,
        ),
        _ => (None, None, 0),
    };

    let payload = headers.payload.slice().to_vec();

    match headers.transport {
        Some(TransportHeader::Tcp(tcp)) => PacketRecord {
            timestamp,
            transport: Protocol::TCP,
            src_ip,
            dst_ip,
            src_port: Some(tcp.source_port),
            dst_port: Some(tcp.destination_port),
            tcp_flags: Some(TcpFlags {
                syn: tcp.syn,
                ack: tcp.ack,
                rst: tcp.rst,
                fin: tcp.fin,
                psh: tcp.psh,
            }),
            length,
            payload,
        },
        Some(TransportHeader::Udp(udp)) => PacketRecord {
            timestamp,
            transport: Protocol::UDP,
            src_ip,
            dst_ip,
            src_port: Some(udp.source_port),
            dst_port: Some(udp.destination_port),
            tcp_flags: None,
            length,
            payload,
        },
        _ => PacketRecord {
            timestamp,
            transport: Protocol::Other(ip_proto),
            src_ip,
            dst_ip,
            src_port: None,
            dst_port: None,
            tcp_flags: None,
            length,
            payload,
        },
    }
}
