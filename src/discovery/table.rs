use crate::address::IPAddress;
use crate::host::HostRecord;
use std::collections::HashMap;
use std::collections::hash_map::Iter;
use std::sync::Arc;

/// Address-keyed set of host records built while reading a capture.
#[derive(Debug, Default)]
pub struct HostTable {
    hosts: HashMap<IPAddress, Arc<HostRecord>>,
}

impl HostTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, address: IPAddress) -> Arc<HostRecord> {
        Arc::clone(
            self.hosts
                .entry(address)
                .or_insert_with(|| Arc::new(HostRecord::with_address(address))),
        )
    }

    pub fn get(&self, address: &IPAddress) -> Option<&Arc<HostRecord>> {
        self.hosts.get(address)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, IPAddress, Arc<HostRecord>> {
        self.hosts.iter()
    }

    /// Hosts in address order.
    pub fn sorted(&self) -> Vec<(IPAddress, Arc<HostRecord>)> {
        let mut hosts: Vec<_> = self
            .hosts
            .iter()
            .map(|(addr, host)| (*addr, Arc::clone(host)))
            .collect();
        hosts.sort_by_key(|(addr, _)| *addr);
        hosts
    }
}
