//! Thread-safe record of what is known about a single host.
//!
//! One [`HostRecord`] exists per tracked address. Packet-processing workers
//! share it behind an `Arc` and call into it directly; every operation takes
//! the record's lock once and releases it before returning. Nothing here
//! waits on I/O or on another record.

use crate::address::IPAddress;
use crate::ids::{AppId, IpProtocol, Policy, Port};
use parking_lot::Mutex;
use tracing::trace;

pub mod entry;
pub mod stats;


pub use entry::{AppMapping, ApplicationEntry};
pub use stats::HostTrackerStats;

use entry::ApplicationList;

#[derive(Debug, Default)]
struct HostState {
    address: IPAddress,
    stream_policy: Policy,
    frag_policy: Policy,
    app_mappings: Vec<AppMapping>,
    services: ApplicationList,
    clients: ApplicationList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Service,
    Client,
}

impl Side {
    fn list(self, state: &mut HostState) -> &mut ApplicationList {
        match self {
            Side::Service => &mut state.services,
            Side::Client => &mut state.clients,
        }
    }

    fn count_add(self) {
        stats::record(|s| match self {
            Side::Service => s.service_adds += 1,
            Side::Client => s.client_adds += 1,
        });
    }

    fn count_find(self) {
        stats::record(|s| match self {
            Side::Service => s.service_finds += 1,
            Side::Client => s.client_finds += 1,
        });
    }

    fn count_remove(self) {
        stats::record(|s| match self {
            Side::Service => s.service_removes += 1,
            Side::Client => s.client_removes += 1,
        });
    }

    fn name(self) -> &'static str {
        match self {
            Side::Service => "service",
            Side::Client => "client",
        }
    }
}

#[derive(Debug, Default)]
pub struct HostRecord {
    state: Mutex<HostState>,
}

impl HostRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(address: IPAddress) -> Self {
        Self {
            state: Mutex::new(HostState {
                address,
                ..HostState::default()
            }),
        }
    }

    pub fn address(&self) -> IPAddress {
        self.state.lock().address
    }

    pub fn set_address(&self, address: IPAddress) {
        self.state.lock().address = address;
    }

    pub fn stream_policy(&self) -> Policy {
        self.state.lock().stream_policy
    }

    pub fn set_stream_policy(&self, policy: Policy) {
        self.state.lock().stream_policy = policy;
    }

    pub fn frag_policy(&self) -> Policy {
        self.state.lock().frag_policy
    }

    pub fn set_frag_policy(&self, policy: Policy) {
        self.state.lock().frag_policy = policy;
    }

    /// Appends a mapping without checking for an existing one.
    ///
    /// Lookups return the first match, so a later mapping for a key that is
    /// already present is never returned by [`find_app_mapping`](Self::find_app_mapping).
    pub fn add_app_mapping(&self, port: Port, ip_protocol: IpProtocol, app_id: AppId) {
        self.state.lock().app_mappings.push(AppMapping {
            port,
            ip_protocol,
            app_id,
        });
    }

    /// Returns the first mapped application, or [`AppId::NONE`].
    pub fn find_app_mapping(&self, port: Port, ip_protocol: IpProtocol) -> AppId {
        self.state
            .lock()
            .app_mappings
            .iter()
            .find(|mapping| mapping.matches(port, ip_protocol))
            .map_or(AppId::NONE, |mapping| mapping.app_id)
    }

    /// Appends the mapping only if the key is unmapped. An existing mapping
    /// is left as is and `app_id` is dropped.
    pub fn find_or_add_app_mapping(&self, port: Port, ip_protocol: IpProtocol, app_id: AppId) -> bool {
        let mut state = self.state.lock();
        if state
            .app_mappings
            .iter()
            .any(|mapping| mapping.matches(port, ip_protocol))
        {
            return false;
        }
        state.app_mappings.push(AppMapping {
            port,
            ip_protocol,
            app_id,
        });
        true
    }

    pub fn app_mappings(&self) -> Vec<AppMapping> {
        self.state.lock().app_mappings.clone()
    }

    /// Adds a service unless one already exists for its key.
    pub fn add_service(&self, entry: ApplicationEntry) -> bool {
        self.add_entry(Side::Service, entry)
    }

    /// Adds a service, replacing any existing one with the same key. The new
    /// entry always ends up first.
    pub fn add_or_replace_service(&self, entry: ApplicationEntry) {
        self.add_or_replace_entry(Side::Service, entry);
    }

    pub fn find_service(&self, ip_protocol: IpProtocol, port: Port) -> Option<ApplicationEntry> {
        self.find_entry(Side::Service, ip_protocol, port)
    }

    /// Removes the service for `(ip_protocol, port)`. Returns whether one existed.
    pub fn remove_service(&self, ip_protocol: IpProtocol, port: Port) -> bool {
        self.remove_entry(Side::Service, ip_protocol, port)
    }

    /// Services, most recently added first.
    pub fn services(&self) -> Vec<ApplicationEntry> {
        self.state.lock().services.to_vec()
    }

    pub fn service_count(&self) -> usize {
        self.state.lock().services.len()
    }

    pub fn add_client(&self, entry: ApplicationEntry) -> bool {
        self.add_entry(Side::Client, entry)
    }

    pub fn add_or_replace_client(&self, entry: ApplicationEntry) {
        self.add_or_replace_entry(Side::Client, entry);
    }

    pub fn find_client(&self, ip_protocol: IpProtocol, port: Port) -> Option<ApplicationEntry> {
        self.find_entry(Side::Client, ip_protocol, port)
    }

    pub fn remove_client(&self, ip_protocol: IpProtocol, port: Port) -> bool {
        self.remove_entry(Side::Client, ip_protocol, port)
    }

    /// Clients, most recently added first.
    pub fn clients(&self) -> Vec<ApplicationEntry> {
        self.state.lock().clients.to_vec()
    }

    pub fn client_count(&self) -> usize {
        self.state.lock().clients.len()
    }

    fn add_entry(&self, side: Side, entry: ApplicationEntry) -> bool {
        side.count_add();

        let (address, added) = {
            let mut state = self.state.lock();
            let added = side.list(&mut state).add(entry);
            (state.address, added)
        };

        trace!(
            host = %address,
            kind = side.name(),
            ip_protocol = %entry.ip_protocol,
            port = entry.port,
            added,
            "Add application entry"
        );
        added
    }

    fn add_or_replace_entry(&self, side: Side, entry: ApplicationEntry) {
        side.count_add();

        let (address, replaced) = {
            let mut state = self.state.lock();
            let replaced = side.list(&mut state).add_or_replace(entry);
            (state.address, replaced)
        };

        trace!(
            host = %address,
            kind = side.name(),
            ip_protocol = %entry.ip_protocol,
            port = entry.port,
            replaced = replaced.is_some(),
            "Add or replace application entry"
        );
    }

    fn find_entry(&self, side: Side, ip_protocol: IpProtocol, port: Port) -> Option<ApplicationEntry> {
        side.count_find();

        let mut state = self.state.lock();
        side.list(&mut state).find(ip_protocol, port)
    }

    fn remove_entry(&self, side: Side, ip_protocol: IpProtocol, port: Port) -> bool {
        side.count_remove();

        let (address, removed) = {
            let mut state = self.state.lock();
            let removed = side.list(&mut state).remove(ip_protocol, port);
            (state.address, removed)
        };

        trace!(
            host = %address,
            kind = side.name(),
            ip_protocol = %ip_protocol,
            port,
            removed,
            "Remove application entry"
        );
        removed
    }
}
