use super::decoder::decode_frame;
use crate::packet::PacketRecord;
use anyhow::{Context, Result};
use pcap_parser::traits::{PcapNGPacketBlock, PcapReaderIterator};
use pcap_parser::*;
use std::fs::File;
use std::time::Instant;
use tracing::{debug, info, warn};

struct InterfaceDescription {
    linktype: Linktype,
    ts_resolution: u8,
    ts_offset: i64,
}

/// Read a PCAPNG capture into decoded records, in capture order. Only a
/// file that cannot be opened or framed as PCAPNG at all is an error.
pub fn parse_capture(file_path: &std::path::Path) -> Result<Vec<PacketRecord>> {
    let file = File::open(file_path).context("Failed to open capture file")?;
    info!(path = ?file_path, "Starting capture read");
    let mut reader = PcapNGReader::new(65536, file)
        .map_err(|e| anyhow::anyhow!("{e:?}"))
        .context("Failed to create capture reader")?;
    let mut interfaces: Vec<InterfaceDescription> = Vec::new();
    let mut records: Vec<PacketRecord> = Vec::new();
    let start_time = Instant::now();

    loop {
        match reader.next() {
            Ok((offset, block)) => {
                match block {
                    PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                        debug!("Encountered SectionHeader; clearing interface descriptions");
                        interfaces.clear();
                    }
                    PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                        interfaces.push(InterfaceDescription {
                            linktype: idb.linktype,
                            ts_resolution: idb.if_tsresol,
                            ts_offset: idb.if_tsoffset,
                        });
                        debug!(
                            if_id = interfaces.len() - 1,
                            "Registered interface description"
                        );
                    }
                    PcapBlockOwned::NG(Block::EnhancedPacket(ref epb)) => {
                        let if_id = epb.if_id as usize;
                        if if_id >= interfaces.len() {
                            warn!(
                                if_id = if_id,
                                "EPB references unknown interface; skipping packet"
                            );
                        } else {
                            let interface = &interfaces[if_id];
                            if interface.linktype == Linktype::ETHERNET {
                                let timestamp = parse_timestamp(epb, interface);
                                records.push(decode_frame(timestamp, epb.packet_data()));
                            } else {
                                debug!(
                                    linktype = ?interface.linktype,
                                    "Unsupported link type; skipping packet"
                                );
                            }
                        }
                    }
                    PcapBlockOwned::NG(Block::SimplePacket(_)) => {
                        debug!("Unsupported block type: SimplePacket")
                    }
                    PcapBlockOwned::NG(Block::NameResolution(_)) => {
                        debug!("Unsupported block type: NameResolution")
                    }
                    PcapBlockOwned::NG(Block::InterfaceStatistics(_)) => {
                        debug!("Unsupported block type: InterfaceStatistics")
                    }
                    PcapBlockOwned::NG(Block::DecryptionSecrets(_)) => {
                        debug!("Unsupported block type: DecryptionSecrets")
                    }
                    PcapBlockOwned::NG(Block::Custom(_)) => {
                        debug!("Unsupported block type: Custom")
                    }
                    PcapBlockOwned::NG(Block::Unknown(_)) => {
                        debug!("Unsupported block type: Unknown")
                    }
                    PcapBlockOwned::NG(Block::SystemdJournalExport(_)) => {
                        debug!("Unsupported block type: SystemdJournalExport")
                    }
                    PcapBlockOwned::NG(Block::ProcessInformation(_)) => {
                        debug!("Unsupported block type: ProcessInformation")
                    }
                    PcapBlockOwned::Legacy(_) => {
                        debug!("Unsupported block type: Legacy")
                    }
                    PcapBlockOwned::LegacyHeader(_) => {
                        debug!("Unsupported block type: LegacyHeader")
                    }
                }
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| anyhow::anyhow!("{e:?}"))
                    .context("Failed to refill capture reader")?;
            }
            Err(e) => {
                return Err(anyhow::anyhow!("{e:?}"))
                    .context("Capture file is not a readable PCAPNG stream");
            }
        }
    }
    let elapsed = start_time.elapsed();
    info!(
        path = ?file_path,
        packets = records.len(),
        elapsed_ms = elapsed.as_millis(),
        "Completed capture read"
    );
    Ok(records)
}

fn calculate_ts_unit(resolution: u8) -> u64 {
    if resolution & 0x80 != 0 {
        2u64.pow((resolution & 0x7F) as u32)
    } else {
        10u64.pow(resolution as u32)
    }
}

fn parse_timestamp(epb: &pcapng::EnhancedPacketBlock, interface: &InterfaceDescription) -> f64 {
    let unit = calculate_ts_unit(interface.ts_resolution);
    epb.decode_ts_f64(interface.ts_offset as u64, unit)
}
