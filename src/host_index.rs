use std::collections::HashMap;
use std::net::SocketAddr;

use crate::types::HostIndex;

/// Assigns a dense, monotonically increasing index to each distinct
/// simulator (address, port) pair seen so far. Indices start at 1 (0 is
/// reserved as invalid) and are never reused or reclaimed, even after the
/// host disappears: local-identity keys built from an index must stay
/// unambiguous for the life of the session.
pub struct HostIndexTable {
    indices: HashMap<SocketAddr, HostIndex>,
    next_index: HostIndex,
}

impl HostIndexTable {
    pub fn new() -> Self {
        Self {
            indices: HashMap::new(),
            next_index: 1,
        }
    }

    /// Returns the index for `host`, allocating the next one on first sight.
    pub fn index_for(&mut self, host: SocketAddr) -> HostIndex {
        if let Some(index) = self.indices.get(&host) {
            return *index;
        }
        let index = self.next_index;
        self.next_index += 1;
        self.indices.insert(host, index);
        index
    }

    /// Non-allocating lookup: `None` if this host has never been indexed.
    pub fn get(&self, host: SocketAddr) -> Option<HostIndex> {
        self.indices.get(&host).copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl Default for HostIndexTable {
    fn default() -> Self {
        Self::new()
    }
}
