use crate::flow::{Endpoint, FlowKey, FlowRecord, FlowState, IPAddress, Protocol};
use crate::packet::{PacketRecord, TcpFlags};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, trace, warn};

pub mod stats;
pub mod tree;


pub use stats::TrafficSummary;
pub use tree::ConnectionTree;

/// One record per normalized flow key, iterable in first-seen order.
/// Records are never removed for the lifetime of a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FlowTable {
    flows: HashMap<FlowKey, FlowRecord>,
    order: Vec<FlowKey>,
}

impl FlowTable {
    pub fn get(&self, key: &FlowKey) -> Option<&FlowRecord> {
        self.flows.get(key)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Flows in the order their first packet arrived.
    pub fn iter(&self) -> impl Iterator<Item = &FlowRecord> {
        self.order.iter().filter_map(|key| self.flows.get(key))
    }

    /// Create-or-fetch on the normalized key: a reply on an existing
    /// conversation lands on the flow its request created.
    fn resolve(
        &mut self,
        src: Endpoint,
        dst: Endpoint,
        protocol: Protocol,
        timestamp: f64,
    ) -> &mut FlowRecord {
        let key = FlowKey::normalized(src, dst, protocol);
        match self.flows.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                trace!(flow = %key.endpoints, ?protocol, "Creating flow record");
                self.order.push(key);
                entry.insert(FlowRecord::new(key, protocol, src, dst, timestamp))
            }
        }
    }
}

/// Packets with no usable transport layer, keyed by rendered source and
/// destination IP. An empty string stands in for a missing IP layer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OtherTraffic {
    buckets: HashMap<(String, String), Vec<Vec<u8>>>,
    order: Vec<(String, String)>,
}

impl OtherTraffic {
    fn push(&mut self, src: Option<IPAddress>, dst: Option<IPAddress>, payload: Vec<u8>) {
        let key = (
            src.map(|ip| ip.to_string()).unwrap_or_default(),
            dst.map(|ip| ip.to_string()).unwrap_or_default(),
        );
        match self.buckets.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().push(payload),
            Entry::Vacant(entry) => {
                self.order.push(entry.key().clone());
                entry.insert(vec![payload]);
            }
        }
    }

    pub fn get(&self, src: &str, dst: &str) -> Option<&[Vec<u8>]> {
        self.buckets
            .get(&(src.to_string(), dst.to_string()))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets in the order their first payload arrived.
    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), &[Vec<u8>])> {
        self.order
            .iter()
            .filter_map(|key| self.buckets.get_key_value(key))
            .map(|(key, payloads)| (key, payloads.as_slice()))
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureAnalysis {
    pub summary: TrafficSummary,
    pub flows: FlowTable,
    pub other: OtherTraffic,
    pub tree: ConnectionTree,
}

/// Single-pass ingestion state: feed packets in capture order, then take
/// the read-only outputs with [`Analyzer::finish`].
#[derive(Debug, Default)]
pub struct Analyzer {
    table: FlowTable,
    other: OtherTraffic,
    summary: TrafficSummary,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record. Never fails: a record claiming a transport layer
    /// without the fields that layer requires is counted and skipped.
    pub fn ingest(&mut self, packet: PacketRecord) {
        self.summary.total_packets += 1;
        match packet.transport {
            Protocol::TCP => self.ingest_tcp(packet),
            Protocol::UDP => self.ingest_udp(packet),
            Protocol::Other(_) => self.ingest_other(packet),
        }
    }

    pub fn finish(self) -> CaptureAnalysis {
        let tree = ConnectionTree::build(&self.table);
        debug!(
            flows = self.table.len(),
            other_buckets = self.other.len(),
            total = self.summary.total_packets,
            "Analysis complete"
        );
        CaptureAnalysis {
            summary: self.summary,
            flows: self.table,
            other: self.other,
            tree,
        }
    }

    fn ingest_tcp(&mut self, packet: PacketRecord) {
        let Some((src, dst, flags)) = tcp_fields(&packet) else {
            self.summary.malformed_packets += 1;
            warn!(packet = %packet.summary(), "Skipping malformed TCP record");
            return;
        };
        self.summary.tcp_packets += 1;
        // One failed transmission per RST packet, whatever the flow state.
        if flags.rst {
            self.summary.failed_transmissions += 1;
        }
        let flow = self
            .table
            .resolve(src, dst, Protocol::TCP, packet.timestamp);
        apply_tcp(flow, packet, flags);
    }

    fn ingest_udp(&mut self, packet: PacketRecord) {
        let Some((src, dst)) = udp_fields(&packet) else {
            self.summary.malformed_packets += 1;
            warn!(packet = %packet.summary(), "Skipping malformed UDP record");
            return;
        };
        self.summary.udp_packets += 1;
        let flow = self
            .table
            .resolve(src, dst, Protocol::UDP, packet.timestamp);
        flow.packet_count += 1;
        flow.last_seen = packet.timestamp;
        flow.packets.push(packet);
    }

    fn ingest_other(&mut self, packet: PacketRecord) {
        self.summary.other_packets += 1;
        self.other.push(packet.src_ip, packet.dst_ip, packet.payload);
    }
}

/// Run the whole pipeline: ingestion in input order, then the read-only
/// statistics and connection-tree passes.
pub fn analyze<I>(packets: I) -> CaptureAnalysis
where
    I: IntoIterator<Item = PacketRecord>,
{
    let mut analyzer = Analyzer::new();
    for packet in packets {
        analyzer.ingest(packet);
    }
    analyzer.finish()
}

fn tcp_fields(packet: &PacketRecord) -> Option<(Endpoint, Endpoint, TcpFlags)> {
    match (
        packet.src_ip,
        packet.dst_ip,
        packet.src_port,
        packet.dst_port,
        packet.tcp_flags,
    ) {
        (Some(src_ip), Some(dst_ip), Some(src_port), Some(dst_port), Some(flags)) => Some((
            Endpoint::new(src_ip, src_port),
            Endpoint::new(dst_ip, dst_port),
            flags,
        )),
        _ => None,
    }
}

fn udp_fields(packet: &PacketRecord) -> Option<(Endpoint, Endpoint)> {
    match (
        packet.src_ip,
        packet.dst_ip,
        packet.src_port,
        packet.dst_port,
    ) {
        (Some(src_ip), Some(dst_ip), Some(src_port), Some(dst_port)) => Some((
            Endpoint::new(src_ip, src_port),
            Endpoint::new(dst_ip, dst_port),
        )),
        _ => None,
    }
}

/// Advance one TCP flow by one packet. RST wins over everything, terminal
/// states absorb the rest, then SYN, ACK during setup, FIN, and last the
/// handshake-candidate check.
fn apply_tcp(flow: &mut FlowRecord, packet: PacketRecord, flags: TcpFlags) {
    flow.packet_count += 1;
    flow.last_seen = packet.timestamp;

    if flags.rst {
        trace!(flow = %flow.key.endpoints, from = ?flow.state, "RST observed");
        flow.state = FlowState::Reset;
        return;
    }
    if flow.is_terminal() {
        return;
    }
    if flags.syn {
        flow.syn_seen = true;
        if flow.state == FlowState::New {
            trace!(flow = %flow.key.endpoints, "SYN observed");
            flow.state = FlowState::SynSeen;
        }
        return;
    }
    if flags.ack && matches!(flow.state, FlowState::New | FlowState::SynSeen) {
        trace!(flow = %flow.key.endpoints, from = ?flow.state, "ACK observed");
        flow.ack_seen = true;
        flow.state = FlowState::AckSeen;
        return;
    }
    if flags.fin {
        trace!(flow = %flow.key.endpoints, from = ?flow.state, "FIN observed");
        flow.state = FlowState::FinSeen;
        return;
    }
    // A PSH+ACK here implies the flow is at least AckSeen; setup states
    // were absorbed by the ACK branch above.
    if flags.psh && flags.ack {
        trace!(flow = %flow.key.endpoints, "Handshake-candidate segment");
        flow.handshake_packets.push(packet);
    }
    // Any other flag combination leaves the flow untouched.
}
