use log::{debug, warn};

use crate::identity::LocalIdentityKey;
use crate::object::{ObjectData, ParentRef};
use crate::region::Region;
use crate::renderer::Renderer;
use crate::types::{GlobalId, LocalId, TypeCode};
use crate::world::WorldSync;

/// One entry of an object-update message, classified by how much identity
/// it carries.
#[derive(Clone, Copy, Debug)]
pub enum UpdateRecord {
    /// Full snapshot: authoritative, always resolvable, may create.
    Full {
        global_id: GlobalId,
        local_id: LocalId,
        type_code: u8,
        data: ObjectData,
    },
    /// Delta carrying only the host-local id. Unresolvable deltas are
    /// dropped (counted, never retried): a terse update for an object we
    /// have no full data for cannot be applied.
    TerseImproved { local_id: LocalId, data: ObjectData },
    /// Integrity tag into the region-side cache; the payload (when the
    /// lookup hits) is a full snapshot written by an earlier update.
    Cached { cache_id: u32, crc: u32 },
    /// Self-describing payload embedding either a full identity or a
    /// terse-style local id.
    Compressed(CompressedUpdate),
}

/// The two embedded forms of a compressed record.
#[derive(Clone, Copy, Debug)]
pub enum CompressedUpdate {
    Full {
        global_id: GlobalId,
        local_id: LocalId,
        type_code: u8,
        data: ObjectData,
    },
    Terse { local_id: LocalId, data: ObjectData },
}

/// One network message: an ordered batch of update records from a single
/// region. Entries are processed strictly in arrival order; per-entry
/// failures are local and never abort the batch.
#[derive(Clone, Debug)]
pub struct UpdateMessage {
    pub records: Vec<UpdateRecord>,
}

impl UpdateMessage {
    pub fn new(records: Vec<UpdateRecord>) -> Self {
        Self { records }
    }
}

/// A record after identity resolution: global identity plus whatever else
/// the entry carried. `type_code` is only present for full-form entries,
/// which is what makes them the only ones that can create.
struct ResolvedEntry {
    global_id: GlobalId,
    local_id: LocalId,
    type_code: Option<u8>,
    data: ObjectData,
}

impl WorldSync {
    /// Ingests one update message from `region`. The batch always
    /// completes: every failure mode here is a per-entry drop.
    pub fn process_update_message(
        &mut self,
        region: &mut dyn Region,
        renderer: &mut dyn Renderer,
        message: UpdateMessage,
    ) {
        for record in message.records {
            self.process_record(region, renderer, record);
        }
    }

    fn process_record(
        &mut self,
        region: &mut dyn Region,
        renderer: &mut dyn Renderer,
        record: UpdateRecord,
    ) {
        let host = region.host();

        let entry = match record {
            UpdateRecord::Full {
                global_id,
                local_id,
                type_code,
                data,
            } => {
                self.registry.stats_mut().full_updates += 1;
                ResolvedEntry {
                    global_id,
                    local_id,
                    type_code: Some(type_code),
                    data,
                }
            }
            UpdateRecord::TerseImproved { local_id, data } => {
                self.registry.stats_mut().terse_updates += 1;
                let Some(global_id) = self.registry.identity_mut().resolve(host, local_id) else {
                    self.registry.stats_mut().unknown_updates += 1;
                    debug!("update for unknown local id {} on host {}", local_id, host);
                    return;
                };
                ResolvedEntry {
                    global_id,
                    local_id,
                    type_code: None,
                    data,
                }
            }
            UpdateRecord::Cached { cache_id, crc } => match region.cache_lookup(cache_id, crc) {
                Some(hit) => {
                    self.registry.stats_mut().full_updates += 1;
                    ResolvedEntry {
                        global_id: hit.global_id,
                        local_id: hit.local_id,
                        type_code: Some(hit.type_code),
                        data: hit.data,
                    }
                }
                None => {
                    self.registry.stats_mut().cache_misses += 1;
                    debug!("cache miss for id {} (crc {})", cache_id, crc);
                    return;
                }
            },
            UpdateRecord::Compressed(CompressedUpdate::Full {
                global_id,
                local_id,
                type_code,
                data,
            }) => {
                self.registry.stats_mut().full_updates += 1;
                ResolvedEntry {
                    global_id,
                    local_id,
                    type_code: Some(type_code),
                    data,
                }
            }
            UpdateRecord::Compressed(CompressedUpdate::Terse { local_id, data }) => {
                self.registry.stats_mut().terse_updates += 1;
                let Some(global_id) = self.registry.identity_mut().resolve(host, local_id) else {
                    self.registry.stats_mut().unknown_updates += 1;
                    debug!(
                        "compressed update for unknown local id {} on host {}",
                        local_id, host
                    );
                    return;
                };
                ResolvedEntry {
                    global_id,
                    local_id,
                    type_code: None,
                    data,
                }
            }
        };

        self.apply_entry(region, renderer, entry);
    }

    fn apply_entry(
        &mut self,
        region: &mut dyn Region,
        renderer: &mut dyn Renderer,
        entry: ResolvedEntry,
    ) {
        let host = region.host();
        let region_id = region.region_id();
        let ResolvedEntry {
            global_id,
            local_id,
            type_code,
            data,
        } = entry;

        // Region-crossing correction: the update names a different local
        // id or region than the object has.
        if let Some(object) = self.registry.get(&global_id) {
            if object.local_id() != local_id || object.region() != region_id {
                self.registry
                    .correct_crossing(global_id, region_id, host, local_id);
            }
        }

        let just_created = if self.registry.contains(&global_id) {
            false
        } else {
            let Some(raw_code) = type_code else {
                // A delta resolved to an id whose object is gone (killed
                // this frame, or the mapping outlived its object): nothing
                // to apply it to.
                self.registry.stats_mut().unknown_updates += 1;
                debug!("update for vanished object {}", global_id);
                return;
            };
            let code = match TypeCode::from_wire(raw_code) {
                Ok(code) => code,
                Err(err) => {
                    self.registry.stats_mut().failed_creates += 1;
                    warn!("create failure for object {}: {}", global_id, err);
                    return;
                }
            };
            if self.blacklist.contains(&global_id) {
                // Denylisted asset: no object, no counters.
                return;
            }
            self.registry
                .create(global_id, code, region_id, host, local_id);
            region.add_to_created_list(local_id);
            self.registry.stats_mut().new_objects += 1;
            true
        };

        // Decode the payload into the object's fields and refresh its
        // activity enrollment.
        let type_code_actual;
        let drawable;
        {
            let Some(object) = self.registry.get_mut(&global_id) else {
                return;
            };
            object.apply_update(&data);
            type_code_actual = object.type_code();
            drawable = object.drawable();
        }
        self.registry.update_active(global_id);

        if just_created {
            let handle = renderer.create_drawable(global_id, type_code_actual);
            if let Some(object) = self.registry.get_mut(&global_id) {
                object.drawable = Some(handle);
            }
        } else if let Some(handle) = drawable {
            renderer.mark_moved(handle);
        }

        // Parent declared by this update.
        match data.parent {
            Some(ParentRef::Root) => {
                if let Some(object) = self.registry.get_mut(&global_id) {
                    object.parent = None;
                    object.orphaned = false;
                }
            }
            Some(ParentRef::Local(parent_local)) => {
                let parent_id = self.registry.identity_mut().resolve(host, parent_local);
                let parent_id = parent_id.filter(|id| self.registry.contains(id));
                match parent_id {
                    Some(parent_id) if parent_id == global_id => {
                        warn!("{} declares itself as parent, ignoring", global_id);
                    }
                    Some(parent_id) => {
                        if let Some(object) = self.registry.get_mut(&global_id) {
                            object.parent = Some(parent_id);
                            object.orphaned = false;
                        }
                    }
                    None => {
                        let host_index = self.registry.identity_mut().index_for(host);
                        let parent_key = LocalIdentityKey {
                            host_index,
                            local_id: parent_local,
                        };
                        self.orphans
                            .orphanize(&mut self.registry, renderer, global_id, parent_key);
                    }
                }
            }
            None => {}
        }

        // This object's identity just became (re)resolvable: reunite any
        // children waiting on it.
        let host_index = self.registry.identity_mut().index_for(host);
        let key = LocalIdentityKey {
            host_index,
            local_id,
        };
        self.orphans
            .find_orphans(&mut self.registry, renderer, global_id, key);
    }
}
