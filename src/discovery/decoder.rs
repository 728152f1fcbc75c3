use crate::address::IPAddress;
use crate::ids::{IpProtocol, Port};
use anyhow::{Result, anyhow};
use etherparse::{NetHeaders, PacketHeaders, TransportHeader};
use tracing::trace;

/// A service answering a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub server: IPAddress,
    pub client: IPAddress,
    pub ip_protocol: IpProtocol,
    pub port: Port,
}

/// Decodes an Ethernet frame and reports a TCP SYN-ACK as a service
/// observation. Frames that decode but carry nothing of interest yield `None`.
pub fn decode_observation(frame: &[u8]) -> Result<Option<Observation>> {
    let headers = PacketHeaders::from_ethernet_slice(frame).map_err(|err| {
        trace!(error = ?err, "Failed to parse packet headers");
        anyhow!("header parse error: {err:?}")
    })?;

    let (src, dst) = match &headers.net {
        Some(NetHeaders::Ipv4(ip, _)) => (IPAddress::V4(ip.source), IPAddress::V4(ip.destination)),
        Some(NetHeaders::Ipv6(ip, _)) => (IPAddress::V6(ip.source), IPAddress::V6(ip.destination)),
        _ => return Ok(None),
    };

    match headers.transport {
        Some(TransportHeader::Tcp(tcp)) if tcp.syn && tcp.ack => Ok(Some(Observation {
            server: src,
            client: dst,
            ip_protocol: IpProtocol::TCP,
            port: tcp.source_port,
        })),
        _ => Ok(None),
    }
}
