use thiserror::Error;

use crate::types::{GlobalId, HostIndex, LocalId};

/// Errors surfaced at the registry's seams.
///
/// Per-entry ingestion failures (unknown local ids, cache misses) are not
/// errors to the caller of `process_update_message`: they are dropped and
/// counted there, and the batch always completes. This enum covers the
/// operations where a caller can actually act on the failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorldError {
    /// Creation request named a classification byte this client does not
    /// understand.
    #[error("unsupported object type code: {0}")]
    UnsupportedTypeCode(u8),

    /// No live mapping exists for this (host, local id) pair.
    #[error("no identity mapping for local id {local_id} on host index {host_index}")]
    UnresolvedIdentity {
        host_index: HostIndex,
        local_id: LocalId,
    },

    /// Object is not present (or already dead) in the registry.
    #[error("object {0} not found in registry")]
    ObjectNotFound(GlobalId),
}
