use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use log::{debug, info, warn};

use crate::error::WorldError;
use crate::identity::LocalIdentityTable;
use crate::object::WorldObject;
use crate::renderer::Renderer;
use crate::types::{GlobalId, LocalId, RegionId, TypeCode};

/// The purge sweep never demands fewer dead objects than this before doing
/// real work.
pub const SWEEP_FLOOR_MIN: usize = 20;
/// Upper bound on the adaptive sweep floor.
pub const SWEEP_FLOOR_MAX: usize = 100;

/// Counters for recoverable ingestion and lifecycle events. None of these
/// are fatal; they exist so the embedder can watch the health of the
/// update stream.
#[derive(Clone, Debug, Default)]
pub struct UpdateStats {
    pub full_updates: u64,
    pub terse_updates: u64,
    pub new_objects: u64,
    /// Terse-style updates for local ids we have never seen full data for.
    pub unknown_updates: u64,
    /// Kill requests naming global ids not present in the registry.
    pub unknown_kills: u64,
    pub cache_misses: u64,
    /// Creation requests dropped for an unsupported type code.
    pub failed_creates: u64,
    /// Children filed in the orphan tables awaiting a parent.
    pub orphans_filed: u64,
}

/// Owns the set of live world objects and everything needed to index them:
/// the identity tables, the active list, and the dead set with its
/// amortized purge.
///
/// All mutation of the primary map and active list funnels through
/// `create`/`kill`/`sweep`; nothing outside this type touches them.
pub struct ObjectRegistry {
    identity: LocalIdentityTable,
    objects: HashMap<GlobalId, WorldObject>,
    /// Primary collection. Holds dead entries until the next sweep; order
    /// is irrelevant.
    roster: Vec<GlobalId>,
    /// Dense list of objects needing per-frame idle work. Every element's
    /// `active_index` equals its position.
    active: Vec<GlobalId>,
    /// Marked dead, not yet purged from `objects`/`roster`.
    dead: HashSet<GlobalId>,
    sweep_floor: usize,
    agent_id: Option<GlobalId>,
    agent_region: Option<(RegionId, SocketAddr)>,
    stats: UpdateStats,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            identity: LocalIdentityTable::new(),
            objects: HashMap::new(),
            roster: Vec::new(),
            active: Vec::new(),
            dead: HashSet::new(),
            sweep_floor: SWEEP_FLOOR_MIN,
            agent_id: None,
            agent_region: None,
            stats: UpdateStats::default(),
        }
    }

    // Lookups. Dead objects are logically removed: they are not findable
    // even though they still occupy the roster until the next sweep.

    pub fn get(&self, id: &GlobalId) -> Option<&WorldObject> {
        self.objects.get(id).filter(|object| !object.dead)
    }

    pub fn get_mut(&mut self, id: &GlobalId) -> Option<&mut WorldObject> {
        self.objects.get_mut(id).filter(|object| !object.dead)
    }

    pub fn contains(&self, id: &GlobalId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.values().filter(|object| !object.dead)
    }

    /// Live object count.
    pub fn len(&self) -> usize {
        self.roster.len() - self.dead.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn active_list(&self) -> &[GlobalId] {
        &self.active
    }

    pub fn dead_len(&self) -> usize {
        self.dead.len()
    }

    pub fn sweep_floor(&self) -> usize {
        self.sweep_floor
    }

    pub fn identity(&self) -> &LocalIdentityTable {
        &self.identity
    }

    pub(crate) fn identity_mut(&mut self) -> &mut LocalIdentityTable {
        &mut self.identity
    }

    /// Resolves a host-scoped identity, surfacing the miss as an error for
    /// callers that need to act on it (the pipeline handles misses itself).
    pub fn resolve_identity(
        &mut self,
        host: SocketAddr,
        local_id: LocalId,
    ) -> Result<GlobalId, WorldError> {
        let host_index = self.identity.index_for(host);
        self.identity
            .resolve(host, local_id)
            .ok_or(WorldError::UnresolvedIdentity {
                host_index,
                local_id,
            })
    }

    pub fn stats(&self) -> &UpdateStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut UpdateStats {
        &mut self.stats
    }

    // Agent bookkeeping. The viewpoint's own avatar is the one object that
    // survives kill requests while a current region exists.

    pub fn set_agent(&mut self, id: GlobalId) {
        self.agent_id = Some(id);
    }

    pub fn agent(&self) -> Option<GlobalId> {
        self.agent_id
    }

    pub fn set_agent_region(&mut self, region: RegionId, host: SocketAddr) {
        self.agent_region = Some((region, host));
    }

    pub fn clear_agent_region(&mut self) {
        self.agent_region = None;
    }

    /// Allocates a new object under `global_id`, binds its local identity,
    /// and enrolls it in the active list if it needs idle work.
    pub(crate) fn create(
        &mut self,
        global_id: GlobalId,
        type_code: TypeCode,
        region: RegionId,
        host: SocketAddr,
        local_id: LocalId,
    ) {
        if self.objects.contains_key(&global_id) {
            // Only a dead, not-yet-swept entry may still occupy this id
            // (kill followed by re-create inside one sweep window). Purge
            // it now so the sweep cannot claim the new instance.
            self.purge_one(global_id);
        }
        self.identity.bind(global_id, host, local_id);
        let object = WorldObject::new(global_id, type_code, region, host, local_id);
        self.insert_object(object);
    }

    /// Creates a client-side object (not streamed from any simulator) with
    /// a freshly generated global id. No local identity is bound: the
    /// object has no host-scoped name until a simulator assigns one.
    pub fn create_local(
        &mut self,
        type_code: TypeCode,
        region: RegionId,
        host: SocketAddr,
        renderer: &mut dyn Renderer,
    ) -> GlobalId {
        let global_id = GlobalId::generate();
        let object = WorldObject::new(global_id, type_code, region, host, 0);
        self.insert_object(object);
        let handle = renderer.create_drawable(global_id, type_code);
        if let Some(object) = self.objects.get_mut(&global_id) {
            object.drawable = Some(handle);
        }
        global_id
    }

    /// Kills the existing instance of `id` and recreates it under the same
    /// global identifier (and local id) with a new classification.
    pub fn replace(
        &mut self,
        id: GlobalId,
        type_code: TypeCode,
        region: RegionId,
        host: SocketAddr,
        renderer: &mut dyn Renderer,
    ) -> Result<(), WorldError> {
        let Some(object) = self.get(&id) else {
            return Err(WorldError::ObjectNotFound(id));
        };
        let local_id = object.local_id;
        self.kill(id, renderer);
        self.create(id, type_code, region, host, local_id);
        Ok(())
    }

    fn insert_object(&mut self, object: WorldObject) {
        let global_id = object.global_id();
        self.objects.insert(global_id, object);
        self.roster.push(global_id);
        self.update_active(global_id);
    }

    /// Marks an object dead. Idempotent; the actual purge from the roster
    /// is deferred to `sweep`. Returns false when the object was not
    /// removed (unknown id, or the own-avatar special case).
    pub fn kill(&mut self, id: GlobalId, renderer: &mut dyn Renderer) -> bool {
        if Some(id) == self.agent_id {
            if let Some((region, host)) = self.agent_region {
                // Never kill the viewpoint's own avatar while a current
                // region exists: re-home it there instead. agent_region is
                // cleared on logout, the only time the avatar truly dies.
                if let Some(object) = self.objects.get_mut(&id) {
                    object.region = region;
                    object.host = host;
                    debug!("kill request for own avatar; re-homed to {:?}", region);
                    return false;
                }
            }
        }

        let Some(object) = self.objects.get_mut(&id) else {
            self.stats.unknown_kills += 1;
            warn!("kill request for unknown object {}", id);
            return false;
        };
        if object.dead {
            return true;
        }
        object.dead = true;
        let host = object.host;
        let local_id = object.local_id;
        let drawable = object.drawable.take();

        self.dead.insert(id);
        self.remove_from_active(id);
        self.identity.unbind(host, local_id, id);
        if let Some(handle) = drawable {
            renderer.release_drawable(handle);
        }
        true
    }

    /// Kills every object owned by `region`, then purges immediately:
    /// survivors of the amortization would reference a region that no
    /// longer exists.
    pub fn kill_region(&mut self, region: RegionId, renderer: &mut dyn Renderer) -> usize {
        let doomed: Vec<GlobalId> = self
            .roster
            .iter()
            .copied()
            .filter(|id| {
                self.objects
                    .get(id)
                    .map_or(false, |object| !object.dead && object.region == region)
            })
            .collect();
        let count = doomed.len();
        for id in doomed {
            self.kill(id, renderer);
        }
        self.sweep(true);
        info!("removed {} objects for region {:?}", count, region);
        count
    }

    /// Shutdown path: kills everything (the own avatar included, since no
    /// region survives) and purges synchronously.
    pub fn kill_all(&mut self, renderer: &mut dyn Renderer) {
        self.agent_region = None;
        let ids = self.roster.clone();
        for id in ids {
            self.kill(id, renderer);
        }
        self.sweep(true);

        if !self.roster.is_empty() {
            warn!("{} roster entries survived kill_all", self.roster.len());
            self.roster.clear();
            self.objects.clear();
        }
        if !self.active.is_empty() {
            warn!("some objects still on active list after kill_all");
            self.active.clear();
        }
    }

    /// Amortized purge of dead entries from the primary collection.
    ///
    /// Skips the scan entirely until the dead set reaches an adaptive
    /// floor: dead objects tend to come in batches, so after a triggered
    /// sweep the floor is raised to the observed batch size (capped), and
    /// it decays by one for every frame the quota is not met. `forced`
    /// bypasses the floor (region teardown, shutdown).
    pub fn sweep(&mut self, forced: bool) {
        if !forced && self.dead.len() < self.sweep_floor {
            self.sweep_floor = self.sweep_floor.saturating_sub(1).max(SWEEP_FLOOR_MIN);
            return;
        }
        self.sweep_floor = self.dead.len().clamp(SWEEP_FLOOR_MIN, SWEEP_FLOOR_MAX);

        // Move dead entries to the tail with pairwise swaps from both ends
        // (a stable filter would shift every surviving element), then
        // truncate once.
        let mut head = 0;
        let mut tail = self.roster.len();
        while head < tail {
            if !self.dead.contains(&self.roster[head]) {
                head += 1;
                continue;
            }
            // Walk tail back to the last surviving entry.
            loop {
                tail -= 1;
                if head == tail || !self.dead.contains(&self.roster[tail]) {
                    break;
                }
            }
            if head == tail {
                break;
            }
            self.roster.swap(head, tail);
            head += 1;
        }
        debug_assert_eq!(self.roster.len() - head, self.dead.len());

        for id in self.roster.drain(head..) {
            self.objects.remove(&id);
        }
        self.dead.clear();
    }

    /// Immediate removal of a single dead entry, outside the sweep. Used
    /// when a killed id gets re-created before the sweep ran.
    fn purge_one(&mut self, id: GlobalId) {
        debug_assert!(self.objects.get(&id).map_or(true, |object| object.dead));
        self.objects.remove(&id);
        self.dead.remove(&id);
        if let Some(position) = self.roster.iter().position(|entry| *entry == id) {
            self.roster.swap_remove(position);
        }
    }

    /// The update names a different local id or region than we have:
    /// the object crossed into a new region. The old key is unbound before
    /// the new one is bound so the table never momentarily holds two keys
    /// for one identifier.
    pub(crate) fn correct_crossing(
        &mut self,
        id: GlobalId,
        region: RegionId,
        host: SocketAddr,
        local_id: LocalId,
    ) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        let old_host = object.host;
        let old_local = object.local_id;

        self.identity.unbind(old_host, old_local, id);
        self.identity.bind(id, host, local_id);

        if let Some(object) = self.objects.get_mut(&id) {
            object.local_id = local_id;
            object.region = region;
            object.host = host;
        }
    }

    /// Enrolls or withdraws an object from the active list according to
    /// its current activity, preserving the index-equals-position
    /// invariant. Dead objects are never updated.
    pub(crate) fn update_active(&mut self, id: GlobalId) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        if object.dead {
            return;
        }
        let should_be_active = object.is_active();
        match object.active_index {
            Some(index) if !should_be_active => {
                debug_assert_eq!(self.active.get(index).copied(), Some(id));
                self.remove_from_active(id);
            }
            Some(index) => {
                assert_eq!(
                    self.active.get(index).copied(),
                    Some(id),
                    "active list index desynchronized"
                );
            }
            None if should_be_active => {
                let index = self.active.len();
                self.active.push(id);
                if let Some(object) = self.objects.get_mut(&id) {
                    object.active_index = Some(index);
                }
            }
            None => {}
        }
    }

    /// O(1) removal: swap the slot with the last element and patch the
    /// moved element's stored index. No gaps, no tombstones.
    pub(crate) fn remove_from_active(&mut self, id: GlobalId) {
        let Some(object) = self.objects.get_mut(&id) else {
            return;
        };
        let Some(index) = object.active_index.take() else {
            return;
        };
        assert_eq!(
            self.active.get(index).copied(),
            Some(id),
            "active list index desynchronized"
        );
        self.active.swap_remove(index);
        if index < self.active.len() {
            let moved = self.active[index];
            if let Some(moved_object) = self.objects.get_mut(&moved) {
                moved_object.active_index = Some(index);
            }
        }
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
