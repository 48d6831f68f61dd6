//! Test fixtures: mock collaborators for the renderer, region, and
//! attribute-fetch transport boundaries.

use std::collections::HashMap;
use std::net::SocketAddr;

use uuid::Uuid;

use crate::fetch::{AttributeKind, AttributeTransport};
use crate::object::ObjectData;
use crate::region::{CacheEntry, Region};
use crate::registry::ObjectRegistry;
use crate::renderer::{DrawableHandle, Renderer};
use crate::types::{GlobalId, LocalId, RegionId};

mod fetch;
mod identity;

pub(crate) struct MockRenderer {
    next_handle: u64,
    pub created: Vec<GlobalId>,
    pub released: Vec<DrawableHandle>,
    pub visibility: Vec<(DrawableHandle, bool)>,
    pub moved: Vec<DrawableHandle>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            created: Vec::new(),
            released: Vec::new(),
            visibility: Vec::new(),
            moved: Vec::new(),
        }
    }
}

impl Renderer for MockRenderer {
    fn create_drawable(
        &mut self,
        object_id: GlobalId,
        _type_code: crate::types::TypeCode,
    ) -> DrawableHandle {
        let handle = DrawableHandle::new(self.next_handle);
        self.next_handle += 1;
        self.created.push(object_id);
        handle
    }

    fn release_drawable(&mut self, handle: DrawableHandle) {
        self.released.push(handle);
    }

    fn set_visible(&mut self, handle: DrawableHandle, visible: bool) {
        self.visibility.push((handle, visible));
    }

    fn mark_moved(&mut self, handle: DrawableHandle) {
        self.moved.push(handle);
    }
}

pub(crate) struct MockRegion {
    id: RegionId,
    host: SocketAddr,
    pub cache: HashMap<(u32, u32), CacheEntry>,
    pub created_list: Vec<LocalId>,
}

impl MockRegion {
    pub fn new(id: u64, host: SocketAddr) -> Self {
        Self {
            id: RegionId(id),
            host,
            cache: HashMap::new(),
            created_list: Vec::new(),
        }
    }
}

impl Region for MockRegion {
    fn region_id(&self) -> RegionId {
        self.id
    }

    fn host(&self) -> SocketAddr {
        self.host
    }

    fn water_height(&self) -> f32 {
        20.0
    }

    fn add_to_created_list(&mut self, local_id: LocalId) {
        self.created_list.push(local_id);
    }

    fn cache_lookup(&mut self, cache_id: u32, crc: u32) -> Option<CacheEntry> {
        self.cache.get(&(cache_id, crc)).copied()
    }
}

pub(crate) struct MockTransport {
    pub batches: Vec<(AttributeKind, Vec<GlobalId>)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
        }
    }
}

impl AttributeTransport for MockTransport {
    fn post_batch(&mut self, kind: AttributeKind, ids: Vec<GlobalId>) {
        self.batches.push((kind, ids));
    }
}

pub(crate) fn host(port: u16) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, 1], port))
}

pub(crate) fn gid(n: u128) -> GlobalId {
    GlobalId::new(Uuid::from_u128(n))
}

pub(crate) fn position_data(position: [f32; 3]) -> ObjectData {
    ObjectData::with_position(position)
}

pub(crate) fn moving_data() -> ObjectData {
    ObjectData {
        velocity: Some([1.0, 0.0, 0.0]),
        ..ObjectData::default()
    }
}

/// Index-equals-position must hold for the whole active list, and every
/// enrolled object must be live and active.
pub(crate) fn assert_active_invariant(registry: &ObjectRegistry) {
    for (index, id) in registry.active_list().iter().enumerate() {
        let object = registry.get(id).expect("active entry must be live");
        assert_eq!(object.active_index, Some(index));
        assert!(object.is_active());
    }
}
