use std::collections::HashSet;
use std::net::SocketAddr;

use log::debug;

use crate::error::WorldError;
use crate::fetch::{
    AttributeFetchQueue, AttributeKind, AttributeResponse, AttributeTransport, CostAttributes,
    PhysicsAttributes,
};
use crate::identity::LocalIdentityKey;
use crate::orphan::OrphanResolver;
use crate::registry::ObjectRegistry;
use crate::renderer::Renderer;
use crate::types::{GlobalId, RegionId, TypeCode};

/// The world-object synchronization core: owns the registry, the orphan
/// tables, and the attribute fetch queues, and drives them from the two
/// entry points the embedder has: inbound update messages and the
/// once-per-frame tick.
///
/// Everything runs on one cooperative thread. The only concurrency-like
/// behavior is the attribute fetch path: requests go out fire-and-forget
/// through [`AttributeTransport`], and their completions are fed back in
/// through `handle_*_response`/`handle_*_failure` at some later frame.
pub struct WorldSync {
    pub(crate) registry: ObjectRegistry,
    pub(crate) orphans: OrphanResolver,
    pub(crate) cost_queue: AttributeFetchQueue,
    pub(crate) physics_queue: AttributeFetchQueue,
    pub(crate) blacklist: HashSet<GlobalId>,
}

impl WorldSync {
    pub fn new() -> Self {
        Self {
            registry: ObjectRegistry::new(),
            orphans: OrphanResolver::new(),
            cost_queue: AttributeFetchQueue::new(AttributeKind::Cost),
            physics_queue: AttributeFetchQueue::new(AttributeKind::Physics),
            blacklist: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    pub fn orphans(&self) -> &OrphanResolver {
        &self.orphans
    }

    pub fn cost_queue(&self) -> &AttributeFetchQueue {
        &self.cost_queue
    }

    pub fn physics_queue(&self) -> &AttributeFetchQueue {
        &self.physics_queue
    }

    /// Denylists a global id: update entries naming it are silently
    /// ignored and no object is ever created for it.
    pub fn blacklist_add(&mut self, id: GlobalId) {
        self.blacklist.insert(id);
    }

    pub fn is_blacklisted(&self, id: &GlobalId) -> bool {
        self.blacklist.contains(id)
    }

    // Lifecycle, delegated to the registry.

    pub fn kill(&mut self, id: GlobalId, renderer: &mut dyn Renderer) -> bool {
        self.registry.kill(id, renderer)
    }

    pub fn kill_region(&mut self, region: RegionId, renderer: &mut dyn Renderer) -> usize {
        self.registry.kill_region(region, renderer)
    }

    pub fn kill_all(&mut self, renderer: &mut dyn Renderer) {
        self.registry.kill_all(renderer)
    }

    pub fn create_local(
        &mut self,
        type_code: TypeCode,
        region: RegionId,
        host: SocketAddr,
        renderer: &mut dyn Renderer,
    ) -> GlobalId {
        self.registry.create_local(type_code, region, host, renderer)
    }

    pub fn replace(
        &mut self,
        id: GlobalId,
        type_code: TypeCode,
        region: RegionId,
        host: SocketAddr,
        renderer: &mut dyn Renderer,
    ) -> Result<(), WorldError> {
        self.registry.replace(id, type_code, region, host, renderer)
    }

    /// Per-frame tick, independent of message arrival: runs the amortized
    /// dead-object sweep and flushes both attribute fetch queues.
    pub fn frame(&mut self, transport: &mut dyn AttributeTransport) {
        self.registry.sweep(false);
        self.cost_queue.flush(transport);
        self.physics_queue.flush(transport);
    }

    // Orphan repair.

    /// Files `child` as awaiting the parent named by `parent_key`.
    pub fn orphanize(
        &mut self,
        renderer: &mut dyn Renderer,
        child: GlobalId,
        parent_key: LocalIdentityKey,
    ) {
        self.orphans
            .orphanize(&mut self.registry, renderer, child, parent_key);
    }

    /// Reunites children waiting on `key` with `parent_id`, now that the
    /// key is resolvable.
    pub fn resolve_orphans(
        &mut self,
        renderer: &mut dyn Renderer,
        parent_id: GlobalId,
        key: LocalIdentityKey,
    ) {
        self.orphans
            .find_orphans(&mut self.registry, renderer, parent_id, key);
    }

    // Attribute staleness and completion.

    /// Flags an object's cost attributes as stale. Cost is computed over
    /// linksets, so a child's fetch always also requests its parent.
    pub fn mark_cost_stale(&mut self, id: GlobalId) {
        if let Some(parent_id) = self.registry.get(&id).and_then(|object| object.parent()) {
            self.cost_queue.mark_stale(parent_id);
        }
        self.cost_queue.mark_stale(id);
    }

    pub fn mark_physics_stale(&mut self, id: GlobalId) {
        self.physics_queue.mark_stale(id);
    }

    /// Applies a completed cost batch. Requested ids absent from the
    /// results are released without data; ids whose object has since been
    /// killed are silently skipped.
    pub fn handle_cost_response(&mut self, response: AttributeResponse<CostAttributes>) {
        for id in &response.requested {
            self.cost_queue.complete(*id);
            match response.results.get(id) {
                Some(attributes) => {
                    if let Some(object) = self.registry.get_mut(id) {
                        object.set_cost(*attributes);
                    }
                }
                None => debug!("no cost data returned for {}", id),
            }
        }
    }

    pub fn handle_cost_failure(&mut self, requested: &[GlobalId]) {
        self.cost_queue.fail_batch(requested);
    }

    pub fn handle_physics_response(&mut self, response: AttributeResponse<PhysicsAttributes>) {
        for id in &response.requested {
            self.physics_queue.complete(*id);
            match response.results.get(id) {
                Some(attributes) => {
                    if let Some(object) = self.registry.get_mut(id) {
                        object.set_physics(*attributes);
                    }
                }
                None => debug!("no physics data returned for {}", id),
            }
        }
    }

    pub fn handle_physics_failure(&mut self, requested: &[GlobalId]) {
        self.physics_queue.fail_batch(requested);
    }
}

impl Default for WorldSync {
    fn default() -> Self {
        Self::new()
    }
}
