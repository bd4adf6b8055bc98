use crate::analyzer::CaptureAnalysis;
use crate::flow::{FlowRecord, FlowState, Protocol};
use std::fmt::{self, Write};

#[cfg(test)]
mod tests;

/// Render the analysis as the plain-text report the binary prints.
pub fn render(analysis: &CaptureAnalysis) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render_into(&mut out, analysis);
    out
}

fn render_into<W: Write>(out: &mut W, analysis: &CaptureAnalysis) -> fmt::Result {
    let summary = &analysis.summary;
    writeln!(out, "Total packets: {}", summary.total_packets)?;
    writeln!(out, "TCP packets: {}", summary.tcp_packets)?;
    writeln!(out, "UDP packets: {}", summary.udp_packets)?;
    writeln!(out, "Other packets: {}", summary.other_packets)?;
    writeln!(out, "Malformed packets: {}", summary.malformed_packets)?;
    writeln!(out, "Failed transmissions: {}", summary.failed_transmissions)?;

    writeln!(out, "TCP connections:")?;
    for flow in analysis.flows.iter().filter(|f| f.protocol == Protocol::TCP) {
        writeln!(out, "{}{}", flow, annotation(flow))?;
        if flow.completed_handshake() && !flow.handshake_packets.is_empty() {
            writeln!(out, "  handshake data:")?;
            for packet in &flow.handshake_packets {
                writeln!(out, "    {}", packet.summary())?;
            }
        }
    }

    writeln!(out, "UDP connections:")?;
    for flow in analysis.flows.iter().filter(|f| f.protocol == Protocol::UDP) {
        writeln!(out, "{} ({} packets)", flow, flow.packet_count)?;
    }

    writeln!(out, "Other traffic:")?;
    for ((src, dst), payloads) in analysis.other.iter() {
        let bytes: usize = payloads.iter().map(Vec::len).sum();
        writeln!(
            out,
            "{} -> {} ({} packets, {} bytes)",
            or_dash(src),
            or_dash(dst),
            payloads.len(),
            bytes
        )?;
    }

    writeln!(out, "Connection tree:")?;
    for flow in analysis.flows.iter().filter(|f| f.completed_handshake()) {
        writeln!(out, "{}", flow)?;
        for key in analysis.tree.downstream(&flow.key) {
            if let Some(child) = analysis.flows.get(key) {
                writeln!(out, "  {}", child)?;
            }
        }
    }

    Ok(())
}

/// Lifecycle suffix for a flow line. Completed conversations render bare,
/// everything else says how far it got.
fn annotation(flow: &FlowRecord) -> &'static str {
    if flow.completed_handshake() {
        return "";
    }
    if flow.syn_seen {
        return " (SYN)";
    }
    if flow.ack_seen {
        return " (ACK)";
    }
    match flow.state {
        FlowState::Reset => " (RST)",
        FlowState::FinSeen => " (FIN)",
        _ => " (NEW)",
    }
}

fn or_dash(ip: &str) -> &str {
    if ip.is_empty() { "<no ip>" } else { ip }
}
