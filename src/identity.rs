use std::collections::HashMap;
use std::net::SocketAddr;

use crate::host_index::HostIndexTable;
use crate::types::{GlobalId, HostIndex, LocalId};

/// Identity of an object as one simulator host currently names it.
/// Unique only while the mapping is live; a global identifier accumulates
/// many of these over its lifetime (one per region it has occupied), but at
/// any instant at most one key maps to it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LocalIdentityKey {
    pub host_index: HostIndex,
    pub local_id: LocalId,
}

/// The single source of truth for "which object is host X currently calling
/// local-id N". Owns the host index table; both are session-scoped state of
/// the registry, not globals.
pub struct LocalIdentityTable {
    hosts: HostIndexTable,
    map: HashMap<LocalIdentityKey, GlobalId>,
}

impl LocalIdentityTable {
    pub fn new() -> Self {
        Self {
            hosts: HostIndexTable::new(),
            map: HashMap::new(),
        }
    }

    pub fn index_for(&mut self, host: SocketAddr) -> HostIndex {
        self.hosts.index_for(host)
    }

    /// Builds the key for `(host, local_id)` without allocating a host
    /// index: `None` means this host has never been heard from, so nothing
    /// can be mapped under it.
    pub fn key_for(&self, host: SocketAddr, local_id: LocalId) -> Option<LocalIdentityKey> {
        let host_index = self.hosts.get(host)?;
        Some(LocalIdentityKey {
            host_index,
            local_id,
        })
    }

    /// Resolves a host-scoped identity to its stable global identifier.
    /// Indexes the host as a side effect: even a failed resolve means we
    /// have now heard from this host.
    pub fn resolve(&mut self, host: SocketAddr, local_id: LocalId) -> Option<GlobalId> {
        let host_index = self.hosts.index_for(host);
        self.map
            .get(&LocalIdentityKey {
                host_index,
                local_id,
            })
            .copied()
    }

    pub fn get(&self, key: LocalIdentityKey) -> Option<GlobalId> {
        self.map.get(&key).copied()
    }

    /// Installs (or overwrites) the mapping for `(host, local_id)`.
    pub fn bind(
        &mut self,
        global_id: GlobalId,
        host: SocketAddr,
        local_id: LocalId,
    ) -> LocalIdentityKey {
        let host_index = self.hosts.index_for(host);
        let key = LocalIdentityKey {
            host_index,
            local_id,
        };
        self.map.insert(key, global_id);
        key
    }

    /// Removes the mapping for `(host, local_id)` only if it still names
    /// `global_id`. Local ids are small integers reused across objects, so
    /// an unguarded erase could zap a mapping that a different object has
    /// since claimed. Returns whether an entry was removed.
    pub fn unbind(&mut self, host: SocketAddr, local_id: LocalId, global_id: GlobalId) -> bool {
        let Some(key) = self.key_for(host, local_id) else {
            return false;
        };
        match self.map.get(&key) {
            Some(mapped) if *mapped == global_id => {
                self.map.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for LocalIdentityTable {
    fn default() -> Self {
        Self::new()
    }
}
