/// Traffic totals for one run. `total_packets` counts every record seen,
/// including malformed ones, so `total = tcp + udp + other + malformed`.
/// `failed_transmissions` counts RST-flagged packets, one per packet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrafficSummary {
    pub total_packets: usize,
    pub tcp_packets: usize,
    pub udp_packets: usize,
    pub other_packets: usize,
    pub malformed_packets: usize,
    pub failed_transmissions: usize,
}

impl TrafficSummary {
    /// Packets that reached a per-protocol path.
    pub fn classified_packets(&self) -> usize {
        self.tcp_packets + self.udp_packets + self.other_packets
    }
}
