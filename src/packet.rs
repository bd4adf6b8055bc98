use crate::flow::{IPAddress, Protocol};
use std::fmt;

/// TCP control bits relevant to flow tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
    pub rst: bool,
    pub fin: bool,
    pub psh: bool,
}

impl TcpFlags {
    pub const SYN: TcpFlags = TcpFlags {
        syn: true,
        ack: false,
        rst: false,
        fin: false,
        psh: false,
    };

    pub const ACK: TcpFlags = TcpFlags {
        syn: false,
        ack: true,
        rst: false,
        fin: false,
        psh: false,
    };

    pub const RST: TcpFlags = TcpFlags {
        syn: false,
        ack: false,
        rst: true,
        fin: false,
        psh: false,
    };

    pub const FIN: TcpFlags = TcpFlags {
        syn: false,
        ack: false,
        rst: false,
        fin: true,
        psh: false,
    };

    pub const PSH_ACK: TcpFlags = TcpFlags {
        syn: false,
        ack: true,
        rst: false,
        fin: false,
        psh: true,
    };
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = Vec::new();
        if self.syn {
            names.push("SYN");
        }
        if self.psh {
            names.push("PSH");
        }
        if self.fin {
            names.push("FIN");
        }
        if self.rst {
            names.push("RST");
        }
        if self.ack {
            names.push("ACK");
        }
        if names.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

/// One decoded captured frame. Layers that were absent or undecodable are
/// `None`; the engine routes such records through the other-traffic rules.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketRecord {
    pub timestamp: f64,
    pub transport: Protocol,
    pub src_ip: Option<IPAddress>,
    pub dst_ip: Option<IPAddress>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    pub tcp_flags: Option<TcpFlags>,
    pub length: u32,
    pub payload: Vec<u8>,
}

impl PacketRecord {
    /// One-line rendering used by the report, e.g.
    /// `TCP 10.0.0.1:1000 -> 10.0.0.2:443 [PSH+ACK] len=571`.
    pub fn summary(&self) -> String {
        let side = |ip: &Option<IPAddress>, port: &Option<u16>| match (ip, port) {
            (Some(ip), Some(port)) => format!("{}:{}", ip, port),
            (Some(ip), None) => ip.to_string(),
            _ => "?".to_string(),
        };
        let proto = match self.transport {
            Protocol::TCP => "TCP".to_string(),
            Protocol::UDP => "UDP".to_string(),
            Protocol::Other(n) => format!("Proto-{}", n),
        };
        match self.tcp_flags {
            Some(flags) => format!(
                "{} {} -> {} [{}] len={}",
                proto,
                side(&self.src_ip, &self.src_port),
                side(&self.dst_ip, &self.dst_port),
                flags,
                self.length
            ),
            None => format!(
                "{} {} -> {} len={}",
                proto,
                side(&self.src_ip, &self.src_port),
                side(&self.dst_ip, &self.dst_port),
                self.length
            ),
        }
    }
}
