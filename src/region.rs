use std::net::SocketAddr;

use crate::object::ObjectData;
use crate::types::{GlobalId, LocalId, RegionId};

/// Payload recovered from a region-side cache hit. Cache entries were
/// written from earlier full updates, so a hit always carries the complete
/// identity (including the raw classification byte) plus decoded data.
#[derive(Clone, Copy, Debug)]
pub struct CacheEntry {
    pub global_id: GlobalId,
    pub local_id: LocalId,
    pub type_code: u8,
    pub data: ObjectData,
}

/// Boundary with the region/simulator collaborator that owns a portion of
/// world space. Implemented by the embedder; the sync core never holds more
/// than a `RegionId` between calls.
pub trait Region {
    fn region_id(&self) -> RegionId;

    /// Network identity of the simulator host backing this region.
    fn host(&self) -> SocketAddr;

    fn water_height(&self) -> f32;

    /// The region tracks which local ids this client has instantiated.
    fn add_to_created_list(&mut self, local_id: LocalId);

    /// Looks up the payload for a `Cached` update record by its integrity
    /// tag. `None` is a cache miss: the entry is dropped for this frame and
    /// the object's state stays whatever it was.
    fn cache_lookup(&mut self, cache_id: u32, crc: u32) -> Option<CacheEntry>;
}
