use std::collections::{HashMap, HashSet};

use log::debug;

use crate::types::GlobalId;

/// Upper bound on ids per batched attribute request. Stale entries beyond
/// the cap wait for the next frame's flush.
pub const MAX_ATTRIBUTE_BATCH: usize = 256;

/// Which derived attribute a queue (and its outbound requests) is about.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AttributeKind {
    Cost,
    Physics,
}

/// Boundary with the network transport for attribute fetches. `post_batch`
/// is fire-and-forget: the call returns immediately, and the completion is
/// delivered later (still on the frame loop) through the queue's
/// `complete`/`fail_batch` path.
pub trait AttributeTransport {
    fn post_batch(&mut self, kind: AttributeKind, ids: Vec<GlobalId>);
}

/// Cost attributes fetched per object.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct CostAttributes {
    pub object_cost: f32,
    pub linkset_cost: f32,
    pub physics_cost: f32,
    pub linkset_physics_cost: f32,
}

/// Physics shape/flags attributes fetched per object.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct PhysicsAttributes {
    pub shape_type: u8,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub gravity_multiplier: f32,
}

/// One completed batch response: the ids that were requested, and the
/// attribute payloads the server actually returned. Requested ids absent
/// from `results` are treated as per-id fetch failures.
#[derive(Clone, Debug)]
pub struct AttributeResponse<A> {
    pub requested: Vec<GlobalId>,
    pub results: HashMap<GlobalId, A>,
}

/// Batches "stale" objects needing a derived attribute into capped
/// asynchronous requests.
///
/// `stale` and `pending` are disjoint by invariant: an id moves from stale
/// to pending when its request is issued, and leaves pending when the
/// response (or failure) arrives. A failed id is not re-queued; a later
/// explicit `mark_stale` is required to retry.
pub struct AttributeFetchQueue {
    kind: AttributeKind,
    stale: HashSet<GlobalId>,
    pending: HashSet<GlobalId>,
}

impl AttributeFetchQueue {
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            stale: HashSet::new(),
            pending: HashSet::new(),
        }
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Flags an object as needing a fetch, unless one is already in flight.
    pub fn mark_stale(&mut self, id: GlobalId) {
        if self.pending.contains(&id) {
            return;
        }
        self.stale.insert(id);
    }

    /// Drains up to [`MAX_ATTRIBUTE_BATCH`] stale ids into `pending` and
    /// issues one batched request. Called once per frame.
    pub fn flush(&mut self, transport: &mut dyn AttributeTransport) {
        if self.stale.is_empty() {
            return;
        }

        let snapshot: Vec<GlobalId> = self.stale.iter().copied().collect();
        let mut batch = Vec::new();
        for id in snapshot {
            if batch.len() >= MAX_ATTRIBUTE_BATCH {
                break;
            }
            self.stale.remove(&id);
            // A request for this id may already be in flight.
            if self.pending.insert(id) {
                batch.push(id);
            }
        }

        if !batch.is_empty() {
            debug!(
                "posting {:?} attribute request for {} objects",
                self.kind,
                batch.len()
            );
            transport.post_batch(self.kind, batch);
        }
    }

    /// Releases an id from `pending` once its response arrived (with or
    /// without data). Returns whether a request was actually in flight.
    pub fn complete(&mut self, id: GlobalId) -> bool {
        self.pending.remove(&id)
    }

    /// Transport or application failure for a whole batch: every id is
    /// released from `pending` and not re-queued.
    pub fn fail_batch(&mut self, requested: &[GlobalId]) {
        for id in requested {
            self.pending.remove(id);
        }
        debug!(
            "{:?} attribute fetch failed for {} objects",
            self.kind,
            requested.len()
        );
    }

    pub fn stale_len(&self) -> usize {
        self.stale.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_stale(&self, id: GlobalId) -> bool {
        self.stale.contains(&id)
    }

    pub fn is_pending(&self, id: GlobalId) -> bool {
        self.pending.contains(&id)
    }
}
