//! # World Sync
//! World-object synchronization and lifecycle core for a networked
//! virtual-world client.
//!
//! Ingests a lossy, partially-ordered stream of per-object updates from
//! simulator hosts, resolves each update's transient host-scoped
//! identifier to a stable global identity, maintains a live object
//! registry with deferred cleanup, repairs parent/child links that arrive
//! out of order, and batches asynchronous fetches of derived attributes.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod error;
mod fetch;
mod host_index;
mod identity;
mod ingest;
mod object;
mod orphan;
mod region;
mod registry;
mod renderer;
mod types;
mod world;

#[cfg(test)]
mod tests;

pub use error::WorldError;
pub use fetch::{
    AttributeFetchQueue, AttributeKind, AttributeResponse, AttributeTransport, CostAttributes,
    PhysicsAttributes, MAX_ATTRIBUTE_BATCH,
};
pub use host_index::HostIndexTable;
pub use identity::{LocalIdentityKey, LocalIdentityTable};
pub use ingest::{CompressedUpdate, UpdateMessage, UpdateRecord};
pub use object::{ObjectData, ParentRef, WorldObject};
pub use region::{CacheEntry, Region};
pub use registry::{ObjectRegistry, UpdateStats, SWEEP_FLOOR_MAX, SWEEP_FLOOR_MIN};
pub use renderer::{DrawableHandle, Renderer};
pub use types::{GlobalId, HostIndex, LocalId, RegionId, TypeCode};
pub use world::WorldSync;

pub use orphan::OrphanResolver;
