use super::decoder::{Observation, decode_observation};
use super::table::HostTable;
use anyhow::{Context, Result, anyhow, bail};
use pcap_parser::traits::{PcapNGPacketBlock, PcapReaderIterator};
use pcap_parser::{Block, Linktype, PcapBlockOwned, PcapError, PcapNGReader};
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Hosts seen in a capture plus the service observations, in capture order.
#[derive(Debug, Default)]
pub struct Capture {
    pub hosts: HostTable,
    pub observations: Vec<Observation>,
    pub packet_count: usize,
}

impl Capture {
    /// Creates records for both ends before queueing the observation, so
    /// workers only ever read the table.
    pub fn push(&mut self, observation: Observation) {
        self.hosts.get_or_create(observation.server);
        self.hosts.get_or_create(observation.client);
        self.observations.push(observation);
    }
}

pub fn read_capture(file_path: &Path) -> Result<Capture> {
    let file = File::open(file_path).context("Failed to open file")?;
    info!(path = ?file_path, "Starting capture read");
    let mut reader = PcapNGReader::new(65536, file)
        .map_err(|e| anyhow!("{e:?}"))
        .context("Failed to create reader")?;
    let mut capture = Capture::default();
    let mut ethernet_interfaces: Vec<bool> = Vec::new();
    let start_time = Instant::now();

    loop {
        match reader.next() {
            Ok((offset, block)) => {
                match block {
                    PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                        debug!("Encountered SectionHeader; clearing interface descriptions");
                        ethernet_interfaces.clear();
                    }
                    PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                        ethernet_interfaces.push(idb.linktype == Linktype::ETHERNET);
                        debug!(
                            if_id = ethernet_interfaces.len() - 1,
                            linktype = ?idb.linktype,
                            "Registered interface description"
                        );
                    }
                    PcapBlockOwned::NG(Block::EnhancedPacket(ref epb)) => {
                        let if_id = epb.if_id as usize;
                        match ethernet_interfaces.get(if_id).copied() {
                            Some(true) => handle_frame(epb.packet_data(), &mut capture),
                            Some(false) => trace!(if_id, "Skipping non-Ethernet packet"),
                            None => warn!(if_id, "EPB references unknown interface; skipping packet"),
                        }
                    }
                    _ => trace!("Skipping unsupported block"),
                }
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| anyhow!("{e:?}"))
                    .context("Failed to refill reader")?;
            }
            Err(e) => bail!("Error while reading packet data: {e:?}"),
        }
    }

    info!(
        path = ?file_path,
        packets = capture.packet_count,
        hosts = capture.hosts.len(),
        observations = capture.observations.len(),
        elapsed_ms = start_time.elapsed().as_millis(),
        "Completed capture read"
    );
    Ok(capture)
}

pub(crate) fn handle_frame(frame: &[u8], capture: &mut Capture) {
    capture.packet_count += 1;
    match decode_observation(frame) {
        Ok(Some(observation)) => capture.push(observation),
        Ok(None) => {}
        Err(e) => trace!(error = %e, "Skipping undecodable frame"),
    }
}
