use std::cell::Cell;
use std::iter::Sum;
use std::ops::AddAssign;

/// Per-thread counts of service and client operations.
///
/// Each worker thread owns its own copy, so bumping a counter never contends
/// with other workers or with a record lock. Totals across workers are built
/// by whoever owns the threads, by summing the snapshots each worker reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostTrackerStats {
    pub service_adds: u64,
    pub service_finds: u64,
    pub service_removes: u64,
    pub client_adds: u64,
    pub client_finds: u64,
    pub client_removes: u64,
}

thread_local! {
    static THREAD_STATS: Cell<HostTrackerStats> = const { Cell::new(HostTrackerStats::ZERO) };
}

impl HostTrackerStats {
    pub const ZERO: HostTrackerStats = HostTrackerStats {
        service_adds: 0,
        service_finds: 0,
        service_removes: 0,
        client_adds: 0,
        client_finds: 0,
        client_removes: 0,
    };

    /// Counters accumulated by the calling thread.
    pub fn snapshot() -> HostTrackerStats {
        THREAD_STATS.with(Cell::get)
    }

    /// Zeroes the calling thread's counters.
    pub fn reset() {
        THREAD_STATS.with(|stats| stats.set(HostTrackerStats::ZERO));
    }

    pub fn total_adds(&self) -> u64 {
        self.service_adds + self.client_adds
    }
}

pub(crate) fn record(update: impl FnOnce(&mut HostTrackerStats)) {
    THREAD_STATS.with(|cell| {
        let mut stats = cell.get();
        update(&mut stats);
        cell.set(stats);
    });
}

impl AddAssign for HostTrackerStats {
    fn add_assign(&mut self, rhs: Self) {
        self.service_adds += rhs.service_adds;
        self.service_finds += rhs.service_finds;
        self.service_removes += rhs.service_removes;
        self.client_adds += rhs.client_adds;
        self.client_finds += rhs.client_finds;
        self.client_removes += rhs.client_removes;
    }
}

impl Sum for HostTrackerStats {
    fn sum<I: Iterator<Item = HostTrackerStats>>(iter: I) -> Self {
        iter.fold(HostTrackerStats::ZERO, |mut total, stats| {
            total += stats;
            total
        })
    }
}
