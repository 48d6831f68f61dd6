use std::collections::HashSet;

use log::{debug, info, warn};

use crate::identity::LocalIdentityKey;
use crate::registry::ObjectRegistry;
use crate::renderer::Renderer;
use crate::types::GlobalId;

/// A child whose declared parent is not yet known, filed under the
/// parent's host-scoped identity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct OrphanEntry {
    parent_key: LocalIdentityKey,
    child: GlobalId,
}

/// Holds children that arrived before their parent, and the reciprocal set
/// of parent keys with unresolved children. The reciprocal set makes the
/// per-update "does anything orphaned depend on me" test a single hash
/// probe instead of a scan over all orphans.
pub struct OrphanResolver {
    pending_parents: HashSet<LocalIdentityKey>,
    children: Vec<OrphanEntry>,
}

impl OrphanResolver {
    pub fn new() -> Self {
        Self {
            pending_parents: HashSet::new(),
            children: Vec::new(),
        }
    }

    pub fn pending_parent_count(&self) -> usize {
        self.pending_parents.len()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_pending_parent(&self, key: LocalIdentityKey) -> bool {
        self.pending_parents.contains(&key)
    }

    /// Files `child` as awaiting the parent named by `parent_key` and hides
    /// its drawable.
    ///
    /// Exception: when the child already has a parent in a *different*
    /// region, the pair is probably mid-flight across a region boundary and
    /// this is just a child update arriving before the parent's. Leave
    /// visibility untouched to avoid a one-frame flicker.
    pub fn orphanize(
        &mut self,
        registry: &mut ObjectRegistry,
        renderer: &mut dyn Renderer,
        child_id: GlobalId,
        parent_key: LocalIdentityKey,
    ) {
        let Some(child) = registry.get(&child_id) else {
            return;
        };
        let child_region = child.region();
        let child_drawable = child.drawable();
        let current_parent = child.parent();

        let mut make_invisible = true;
        if let Some(parent_id) = current_parent {
            if let Some(parent) = registry.get(&parent_id) {
                if parent.region() != child_region {
                    make_invisible = false;
                }
            }
        }

        if let Some(child) = registry.get_mut(&child_id) {
            child.orphaned = true;
        }
        if make_invisible {
            if let Some(handle) = child_drawable {
                renderer.set_visible(handle, false);
            }
        }

        debug!("orphaning {} under parent key {:?}", child_id, parent_key);

        self.pending_parents.insert(parent_key);
        let entry = OrphanEntry {
            parent_key,
            child: child_id,
        };
        if !self.children.contains(&entry) {
            self.children.push(entry);
            registry.stats_mut().orphans_filed += 1;
        }
    }

    /// Called after any object's identity becomes resolvable at `key`:
    /// reunites every child filed under that key with `parent_id`.
    /// Idempotent: once a key is cleared, a second call is a no-op.
    pub fn find_orphans(
        &mut self,
        registry: &mut ObjectRegistry,
        renderer: &mut dyn Renderer,
        parent_id: GlobalId,
        key: LocalIdentityKey,
    ) {
        if self.pending_parents.is_empty() || !self.pending_parents.contains(&key) {
            return;
        }
        let Some(parent) = registry.get(&parent_id) else {
            warn!("resolved orphan parent {} is not in the registry", parent_id);
            return;
        };
        let parent_drawable = parent.drawable();

        let mut matched = Vec::new();
        self.children.retain(|entry| {
            if entry.parent_key == key {
                matched.push(entry.child);
                false
            } else {
                true
            }
        });
        self.pending_parents.remove(&key);

        let mut orphans_found = false;
        for child_id in matched {
            if child_id == parent_id {
                warn!("{} has self as parent, skipping", parent_id);
                continue;
            }
            let Some(child) = registry.get_mut(&child_id) else {
                info!("missing orphan child {}, dropping entry", child_id);
                continue;
            };
            child.parent = Some(parent_id);
            child.orphaned = false;
            if let Some(handle) = child.drawable() {
                // Restore visibility and reattach under the parent's
                // drawable.
                renderer.set_visible(handle, true);
                renderer.mark_moved(handle);
            }
            orphans_found = true;
        }

        if orphans_found {
            if let Some(handle) = parent_drawable {
                renderer.mark_moved(handle);
            }
        }
    }
}

impl Default for OrphanResolver {
    fn default() -> Self {
        Self::new()
    }
}
