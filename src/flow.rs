use crate::packet::PacketRecord;
use std::cmp::Ordering;
use std::fmt;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IPAddress {
    V4([u8; 4]),
    V6([u8; 16]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    TCP,
    UDP,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub ip: IPAddress,
    pub port: u16,
}

/// Endpoint pair in a direction-independent order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowEndpoints {
    pub first: Endpoint,
    pub second: Endpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub endpoints: FlowEndpoints,
    pub protocol: Protocol,
}

/// Lifecycle stage of a tracked flow. `Reset` and `FinSeen` are terminal;
/// a flow never moves backward through the earlier stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    New,
    SynSeen,
    AckSeen,
    Established,
    Reset,
    FinSeen,
}

/// All tracked state for one conversation. `source`/`destination` keep the
/// orientation of the first packet seen on the key.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub key: FlowKey,
    pub protocol: Protocol,
    pub state: FlowState,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub first_seen: f64,
    pub last_seen: f64,
    pub packet_count: usize,
    /// PSH+ACK segments seen after establishment. A flag-based guess at
    /// handshake traffic: any data-bearing segment matches, so this marks
    /// "application data exchanged", not a verified TLS handshake.
    pub handshake_packets: Vec<PacketRecord>,
    /// Datagrams in arrival order. Populated for UDP flows only; TCP flows
    /// keep just the handshake candidates above.
    pub packets: Vec<PacketRecord>,
    pub syn_seen: bool,
    pub ack_seen: bool,
}

impl FlowRecord {
    pub fn new(
        key: FlowKey,
        protocol: Protocol,
        source: Endpoint,
        destination: Endpoint,
        timestamp: f64,
    ) -> Self {
        FlowRecord {
            key,
            protocol,
            state: FlowState::New,
            source,
            destination,
            first_seen: timestamp,
            last_seen: timestamp,
            packet_count: 0,
            handshake_packets: Vec::new(),
            packets: Vec::new(),
            syn_seen: false,
            ack_seen: false,
        }
    }

    /// Both a SYN-bearing and an ACK-bearing packet were observed, in
    /// either order.
    pub fn completed_handshake(&self) -> bool {
        self.syn_seen && self.ack_seen
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, FlowState::Reset | FlowState::FinSeen)
    }
}

impl fmt::Display for FlowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

impl fmt::Display for IPAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IPAddress::V4(bytes) => {
                write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
            }
            IPAddress::V6(bytes) => {
                let segments: Vec<String> = bytes
                    .chunks(2)
                    .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                    .map(|segment| format!("{:x}", segment))
                    .collect();
                write!(f, "{}", segments.join(":"))
            }
        }
    }
}

impl IPAddress {
    fn cmp_bytes(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IPAddress::V4(a), IPAddress::V4(b)) => a.cmp(b),
            (IPAddress::V4(_), IPAddress::V6(_)) => Ordering::Less,
            (IPAddress::V6(_), IPAddress::V4(_)) => Ordering::Greater,
            (IPAddress::V6(a), IPAddress::V6(b)) => a.cmp(b),
        }
    }
}

impl Ord for IPAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_bytes(other)
    }
}

impl PartialOrd for IPAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Endpoint {
    pub fn new(ip: IPAddress, port: u16) -> Self {
        Self { ip, port }
    }
}

impl Ord for Endpoint {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.ip.cmp(&other.ip) {
            Ordering::Equal => self.port.cmp(&other.port),
            ord => ord,
        }
    }
}

impl PartialOrd for Endpoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FlowEndpoints {
    pub fn new(a: Endpoint, b: Endpoint) -> Self {
        FlowEndpoints {
            first: std::cmp::min(a, b),
            second: std::cmp::max(a, b),
        }
    }
}

impl FlowKey {
    /// `(a, b)` and `(b, a)` produce equal keys, so a lookup on the key of
    /// a reply finds the flow its request created.
    pub fn normalized(a: Endpoint, b: Endpoint, protocol: Protocol) -> Self {
        FlowKey {
            endpoints: FlowEndpoints::new(a, b),
            protocol,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl fmt::Display for FlowEndpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ↔ {}", self.first, self.second)
    }
}
