use anyhow::Result;
use clap::Parser;
use hostwatch::discovery::{read_capture, run_workers};
use hostwatch::logging::{LogTarget, init_logging};
use std::path::PathBuf;
use tracing::info;
use tracing::level_filters::LevelFilter;

/// Passively discover host services from a pcapng capture.
#[derive(Debug, Parser)]
#[command(name = "hostwatch", version)]
struct Args {
    /// Capture file to read (pcapng, Ethernet link type)
    pcap: PathBuf,

    /// Worker threads applying observations to host records
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Log file path, ignored with --log-stdout
    #[arg(long, default_value = "hostwatch.log")]
    log_file: PathBuf,

    /// Log to stdout instead of a file
    #[arg(long)]
    log_stdout: bool,

    /// Default log level; RUST_LOG overrides it
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let target = if args.log_stdout {
        LogTarget::Stdout
    } else {
        LogTarget::File(args.log_file.clone())
    };
    let _guard = init_logging(&target, args.log_level)?;

    let capture = read_capture(&args.pcap)?;
    let stats = run_workers(&capture.hosts, &capture.observations, args.workers);
    info!(hosts = capture.hosts.len(), ?stats, "Discovery complete");

    for (address, host) in capture.hosts.sorted() {
        let services: Vec<String> = host.services().iter().map(ToString::to_string).collect();
        let clients: Vec<String> = host.clients().iter().map(ToString::to_string).collect();
        println!(
            "{address}  services=[{}]  clients=[{}]",
            services.join(", "),
            clients.join(", ")
        );
    }
    println!(
        "service adds={} finds={} removes={}  client adds={} finds={} removes={}",
        stats.service_adds,
        stats.service_finds,
        stats.service_removes,
        stats.client_adds,
        stats.client_finds,
        stats.client_removes
    );
    Ok(())
}
