use std::net::SocketAddr;

use crate::fetch::{CostAttributes, PhysicsAttributes};
use crate::renderer::DrawableHandle;
use crate::types::{GlobalId, LocalId, RegionId, TypeCode};

/// Parent declaration carried by an update payload.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParentRef {
    /// Explicitly a root object (no parent).
    Root,
    /// Parent named by its host-local id on the sending simulator.
    Local(LocalId),
}

/// Decoded update payload. The wire encoding of individual fields is an
/// external unpacker's concern; by the time a record reaches the pipeline
/// it carries one of these. `None` fields were not present in the update
/// (terse deltas describe only what changed).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct ObjectData {
    pub position: Option<[f32; 3]>,
    pub velocity: Option<[f32; 3]>,
    pub parent: Option<ParentRef>,
}

impl ObjectData {
    pub fn with_position(position: [f32; 3]) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }
}

/// A single synchronized world object.
///
/// Owned exclusively by the registry; every other subsystem refers to it by
/// `GlobalId` (or by the renderer's drawable handle) and goes through a
/// checked lookup, so a purged object can never be reached through a stale
/// reference.
pub struct WorldObject {
    global_id: GlobalId,
    type_code: TypeCode,
    pub(crate) local_id: LocalId,
    pub(crate) region: RegionId,
    /// Host of the owning region; follows `region` on crossings. Kept on
    /// the object so the identity table can be cleaned without a region
    /// lookup at kill time.
    pub(crate) host: SocketAddr,
    pub(crate) parent: Option<GlobalId>,
    pub(crate) dead: bool,
    pub(crate) orphaned: bool,
    /// Slot in the registry's active list, when enrolled. Invariant:
    /// `active[active_index] == global_id` whenever set.
    pub(crate) active_index: Option<usize>,
    pub(crate) drawable: Option<DrawableHandle>,

    position: [f32; 3],
    velocity: [f32; 3],
    moving: bool,
    cost: Option<CostAttributes>,
    physics: Option<PhysicsAttributes>,
}

impl WorldObject {
    pub(crate) fn new(
        global_id: GlobalId,
        type_code: TypeCode,
        region: RegionId,
        host: SocketAddr,
        local_id: LocalId,
    ) -> Self {
        Self {
            global_id,
            type_code,
            local_id,
            region,
            host,
            parent: None,
            dead: false,
            orphaned: false,
            active_index: None,
            drawable: None,
            position: [0.0; 3],
            velocity: [0.0; 3],
            moving: false,
            cost: None,
            physics: None,
        }
    }

    pub fn global_id(&self) -> GlobalId {
        self.global_id
    }

    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    pub fn local_id(&self) -> LocalId {
        self.local_id
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn host(&self) -> SocketAddr {
        self.host
    }

    pub fn parent(&self) -> Option<GlobalId> {
        self.parent
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_orphaned(&self) -> bool {
        self.orphaned
    }

    /// Whether this object requires per-frame idle work. Avatars always do;
    /// everything else only while independently moving.
    pub fn is_active(&self) -> bool {
        self.type_code.is_avatar() || self.moving
    }

    pub fn on_active_list(&self) -> bool {
        self.active_index.is_some()
    }

    pub fn drawable(&self) -> Option<DrawableHandle> {
        self.drawable
    }

    pub fn position(&self) -> [f32; 3] {
        self.position
    }

    pub fn velocity(&self) -> [f32; 3] {
        self.velocity
    }

    pub fn cost(&self) -> Option<CostAttributes> {
        self.cost
    }

    pub fn physics(&self) -> Option<PhysicsAttributes> {
        self.physics
    }

    /// Applies a decoded payload to this object's fields. Parenting is not
    /// handled here: the pipeline resolves (or orphan-files) the declared
    /// parent after the apply.
    pub(crate) fn apply_update(&mut self, data: &ObjectData) {
        if let Some(position) = data.position {
            self.position = position;
        }
        if let Some(velocity) = data.velocity {
            self.velocity = velocity;
            self.moving = velocity != [0.0; 3];
        }
    }

    pub(crate) fn set_cost(&mut self, cost: CostAttributes) {
        self.cost = Some(cost);
    }

    pub(crate) fn set_physics(&mut self, physics: PhysicsAttributes) {
        self.physics = Some(physics);
    }
}
