use super::decoder::Observation;
use super::table::HostTable;
use crate::host::{ApplicationEntry, HostTrackerStats};
use crate::ids::ProtocolId;
use std::thread;
use tracing::{debug, info, warn};

/// Records the server side as a service and the client side as a client of
/// the same port. Hosts missing from the table are skipped.
pub fn apply_observation(table: &HostTable, observation: &Observation) {
    let entry = ApplicationEntry::new(observation.ip_protocol, observation.port, ProtocolId::UNKNOWN);

    match table.get(&observation.server) {
        Some(server) => {
            if server.add_service(entry) {
                debug!(host = %observation.server, service = %entry, "Discovered service");
            }
        }
        None => warn!(host = %observation.server, "Observation for untracked server"),
    }

    match table.get(&observation.client) {
        Some(client) => {
            client.add_client(entry);
        }
        None => warn!(host = %observation.client, "Observation for untracked client"),
    }
}

/// Applies `observations` from `workers` threads sharing the same records and
/// returns the sum of each worker's counters.
pub fn run_workers(table: &HostTable, observations: &[Observation], workers: usize) -> HostTrackerStats {
    let workers = workers.max(1);
    let chunk_size = observations.len().div_ceil(workers).max(1);
    info!(
        observations = observations.len(),
        workers,
        chunk_size,
        "Applying observations"
    );

    thread::scope(|scope| {
        let handles: Vec<_> = observations
            .chunks(chunk_size)
            .enumerate()
            .map(|(worker, chunk)| {
                scope.spawn(move || {
                    HostTrackerStats::reset();
                    for observation in chunk {
                        apply_observation(table, observation);
                    }
                    let stats = HostTrackerStats::snapshot();
                    debug!(worker, applied = chunk.len(), ?stats, "Worker finished");
                    stats
                })
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| match handle.join() {
                Ok(stats) => Some(stats),
                Err(_) => {
                    warn!("Worker thread panicked; its counters are lost");
                    None
                }
            })
            .sum()
    })
}
