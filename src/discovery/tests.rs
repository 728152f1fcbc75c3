use super::reader::handle_frame;
use super::*;
use crate::address::IPAddress;
use crate::host::HostTrackerStats;
use crate::ids::{IpProtocol, ProtocolId};
use etherparse::PacketBuilder;
use std::fs;

const SERVER: [u8; 4] = [10, 0, 0, 1];
const CLIENT: [u8; 4] = [10, 0, 0, 2];

fn tcp_frame(src: [u8; 4], dst: [u8; 4], src_port: u16, dst_port: u16, syn: bool, ack: bool) -> Vec<u8> {
    let mut builder = PacketBuilder::ethernet2([2, 0, 0, 0, 0, 1], [2, 0, 0, 0, 0, 2])
        .ipv4(src, dst, 64)
        .tcp(src_port, dst_port, 1000, 65535);
    if syn {
        builder = builder.syn();
    }
    if ack {
        builder = builder.ack(1);
    }
    let mut frame = Vec::with_capacity(builder.size(0));
    builder.write(&mut frame, &[]).expect("build tcp frame");
    frame
}

fn syn_ack(server: [u8; 4], client: [u8; 4], port: u16) -> Vec<u8> {
    tcp_frame(server, client, port, 40000, true, true)
}

fn udp_frame() -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([2, 0, 0, 0, 0, 1], [2, 0, 0, 0, 0, 2])
        .ipv4(CLIENT, SERVER, 64)
        .udp(5353, 53);
    let payload = [0u8; 12];
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, &payload).expect("build udp frame");
    frame
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let padded = body.len().div_ceil(4) * 4;
    let total = (12 + padded) as u32;
    let mut block = Vec::with_capacity(total as usize);
    block.extend_from_slice(&block_type.to_le_bytes());
    block.extend_from_slice(&total.to_le_bytes());
    block.extend_from_slice(body);
    block.resize(8 + padded, 0);
    block.extend_from_slice(&total.to_le_bytes());
    block
}

fn pcapng_file(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut shb = Vec::new();
    shb.extend_from_slice(&0x1A2B_3C4Du32.to_le_bytes());
    shb.extend_from_slice(&1u16.to_le_bytes());
    shb.extend_from_slice(&0u16.to_le_bytes());
    shb.extend_from_slice(&(-1i64).to_le_bytes());

    let mut idb = Vec::new();
    idb.extend_from_slice(&1u16.to_le_bytes());
    idb.extend_from_slice(&0u16.to_le_bytes());
    idb.extend_from_slice(&65535u32.to_le_bytes());

    let mut out = pcapng_block(0x0A0D_0D0A, &shb);
    out.extend(pcapng_block(1, &idb));
    for frame in frames {
        let mut epb = Vec::new();
        epb.extend_from_slice(&0u32.to_le_bytes());
        epb.extend_from_slice(&0u32.to_le_bytes());
        epb.extend_from_slice(&0u32.to_le_bytes());
        epb.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        epb.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        epb.extend_from_slice(frame);
        out.extend(pcapng_block(6, &epb));
    }
    out
}

#[test]
fn syn_ack_yields_observation() {
    let observation = decode_observation(&syn_ack(SERVER, CLIENT, 443))
        .expect("decodes")
        .expect("observation");

    assert_eq!(observation.server, IPAddress::V4(SERVER));
    assert_eq!(observation.client, IPAddress::V4(CLIENT));
    assert_eq!(observation.ip_protocol, IpProtocol::TCP);
    assert_eq!(observation.port, 443);
}

#[test]
fn other_packets_yield_nothing() {
    let syn = tcp_frame(CLIENT, SERVER, 40000, 443, true, false);
    let plain_ack = tcp_frame(CLIENT, SERVER, 40000, 443, false, true);

    assert_eq!(decode_observation(&syn).expect("decodes"), None);
    assert_eq!(decode_observation(&plain_ack).expect("decodes"), None);
    assert_eq!(decode_observation(&udp_frame()).expect("decodes"), None);
}

#[test]
fn truncated_frame_is_an_error() {
    assert!(decode_observation(&[0u8; 4]).is_err());
}

#[test]
fn handle_frame_creates_both_hosts() {
    let mut capture = Capture::default();
    handle_frame(&syn_ack(SERVER, CLIENT, 22), &mut capture);
    handle_frame(&udp_frame(), &mut capture);
    handle_frame(&[0u8; 3], &mut capture);

    assert_eq!(capture.packet_count, 3);
    assert_eq!(capture.observations.len(), 1);
    assert_eq!(capture.hosts.len(), 2);
    assert!(capture.hosts.get(&IPAddress::V4(SERVER)).is_some());
}

#[test]
fn apply_observation_records_service_and_client() {
    let mut capture = Capture::default();
    handle_frame(&syn_ack(SERVER, CLIENT, 80), &mut capture);

    apply_observation(&capture.hosts, &capture.observations[0]);

    let server = capture.hosts.get(&IPAddress::V4(SERVER)).expect("server tracked");
    let client = capture.hosts.get(&IPAddress::V4(CLIENT)).expect("client tracked");
    let service = server.find_service(IpProtocol::TCP, 80).expect("service recorded");
    assert_eq!(service.protocol_id, ProtocolId::UNKNOWN);
    assert!(client.find_client(IpProtocol::TCP, 80).is_some());
    assert!(client.find_service(IpProtocol::TCP, 80).is_none());
}

#[test]
fn workers_share_records_and_sum_counters() {
    let mut capture = Capture::default();
    for port in 1..=40u16 {
        handle_frame(&syn_ack(SERVER, CLIENT, port), &mut capture);
    }
    // Retransmitted SYN-ACKs must not add duplicate services.
    for port in 1..=10u16 {
        handle_frame(&syn_ack(SERVER, CLIENT, port), &mut capture);
    }

    let stats = run_workers(&capture.hosts, &capture.observations, 4);

    let server = capture.hosts.get(&IPAddress::V4(SERVER)).expect("server tracked");
    let client = capture.hosts.get(&IPAddress::V4(CLIENT)).expect("client tracked");
    assert_eq!(server.service_count(), 40);
    assert_eq!(client.client_count(), 40);
    assert_eq!(stats.service_adds, 50);
    assert_eq!(stats.client_adds, 50);
    assert_eq!(stats, HostTrackerStats { service_adds: 50, client_adds: 50, ..HostTrackerStats::ZERO });
}

#[test]
fn run_workers_with_no_observations() {
    let table = HostTable::new();
    assert_eq!(run_workers(&table, &[], 0), HostTrackerStats::ZERO);
}

#[test]
fn read_capture_reports_services() {
    let path = std::env::temp_dir().join("hostwatch_read_capture_test.pcapng");
    let frames = vec![
        syn_ack(SERVER, CLIENT, 443),
        udp_frame(),
        syn_ack([10, 0, 0, 3], CLIENT, 22),
    ];
    fs::write(&path, pcapng_file(&frames)).expect("write temp pcapng");

    let capture = read_capture(&path).expect("read capture");
    let _ = fs::remove_file(&path);

    assert_eq!(capture.packet_count, 3);
    assert_eq!(capture.observations.len(), 2);
    assert_eq!(capture.hosts.len(), 3);
    let order: Vec<IPAddress> = capture.hosts.sorted().into_iter().map(|(addr, _)| addr).collect();
    assert_eq!(
        order,
        vec![IPAddress::V4(SERVER), IPAddress::V4(CLIENT), IPAddress::V4([10, 0, 0, 3])]
    );
}

#[test]
fn read_capture_rejects_invalid_file() {
    let path = std::env::temp_dir().join("hostwatch_empty_test.pcapng");
    fs::File::create(&path).expect("create temp pcap");

    let result = read_capture(&path);
    let _ = fs::remove_file(&path);

    assert!(result.is_err(), "empty capture should not parse");
}

#[test]
fn read_capture_missing_file() {
    let path = std::env::temp_dir().join("hostwatch_does_not_exist.pcapng");
    let err = read_capture(&path).expect_err("missing file");
    assert!(err.to_string().contains("Failed to open file"));
}
