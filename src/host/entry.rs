use crate::ids::{AppId, IpProtocol, Port, ProtocolId};
use std::collections::VecDeque;
use std::fmt;

/// A service or client application seen on a host.
///
/// Lookups match on `(ip_protocol, port)` only, so replacing an entry can
/// change its `protocol_id` without adding a second one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ApplicationEntry {
    pub port: Port,
    pub ip_protocol: IpProtocol,
    pub protocol_id: ProtocolId,
}

impl ApplicationEntry {
    pub fn new(ip_protocol: IpProtocol, port: Port, protocol_id: ProtocolId) -> Self {
        Self {
            port,
            ip_protocol,
            protocol_id,
        }
    }

    pub fn key(&self) -> (IpProtocol, Port) {
        (self.ip_protocol, self.port)
    }

    pub fn matches(&self, ip_protocol: IpProtocol, port: Port) -> bool {
        self.ip_protocol == ip_protocol && self.port == port
    }
}

impl fmt::Display for ApplicationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.ip_protocol, self.port, self.protocol_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppMapping {
    pub port: Port,
    pub ip_protocol: IpProtocol,
    pub app_id: AppId,
}

impl AppMapping {
    pub fn matches(&self, port: Port, ip_protocol: IpProtocol) -> bool {
        self.port == port && self.ip_protocol == ip_protocol
    }
}

/// Most-recent-first list of application entries, at most one per key.
#[derive(Debug, Clone, Default)]
pub(crate) struct ApplicationList {
    entries: VecDeque<ApplicationEntry>,
}

impl ApplicationList {
    fn position(&self, ip_protocol: IpProtocol, port: Port) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.matches(ip_protocol, port))
    }

    /// Inserts at the front unless the key is already present.
    pub fn add(&mut self, entry: ApplicationEntry) -> bool {
        if self.position(entry.ip_protocol, entry.port).is_some() {
            return false;
        }
        self.entries.push_front(entry);
        true
    }

    /// Moves `entry` to the front, dropping any entry with the same key.
    /// Returns the entry it displaced.
    pub fn add_or_replace(&mut self, entry: ApplicationEntry) -> Option<ApplicationEntry> {
        let replaced = self
            .position(entry.ip_protocol, entry.port)
            .and_then(|idx| self.entries.remove(idx));
        self.entries.push_front(entry);
        replaced
    }

    pub fn find(&self, ip_protocol: IpProtocol, port: Port) -> Option<ApplicationEntry> {
        self.entries
            .iter()
            .find(|entry| entry.matches(ip_protocol, port))
            .copied()
    }

    pub fn remove(&mut self, ip_protocol: IpProtocol, port: Port) -> bool {
        match self.position(ip_protocol, port) {
            Some(idx) => self.entries.remove(idx).is_some(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn to_vec(&self) -> Vec<ApplicationEntry> {
        self.entries.iter().copied().collect()
    }
}
