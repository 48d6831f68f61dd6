use crate::error::WorldError;
use crate::identity::LocalIdentityTable;
use crate::registry::ObjectRegistry;
use crate::tests::{gid, host};
use crate::types::{RegionId, TypeCode};

#[test]
fn host_indices_are_dense_and_stable() {
    let mut table = LocalIdentityTable::new();

    let first = table.index_for(host(9000));
    let second = table.index_for(host(9001));
    assert_eq!(first, 1);
    assert_eq!(second, 2);

    // Re-asking never reallocates.
    assert_eq!(table.index_for(host(9000)), 1);
    assert_eq!(table.index_for(host(9001)), 2);
}

#[test]
fn key_for_unknown_host_is_none() {
    let table = LocalIdentityTable::new();
    assert!(table.key_for(host(9000), 7).is_none());
}

#[test]
fn bind_resolve_roundtrip_and_overwrite() {
    let mut table = LocalIdentityTable::new();
    let g1 = gid(1);
    let g2 = gid(2);

    table.bind(g1, host(9000), 7);
    assert_eq!(table.resolve(host(9000), 7), Some(g1));

    // A different object claiming the same local id overwrites.
    table.bind(g2, host(9000), 7);
    assert_eq!(table.resolve(host(9000), 7), Some(g2));
    assert_eq!(table.len(), 1);
}

#[test]
fn unbind_is_guarded_against_overwritten_entries() {
    let mut table = LocalIdentityTable::new();
    let g1 = gid(1);
    let g2 = gid(2);

    table.bind(g1, host(9000), 7);
    table.bind(g2, host(9000), 7);

    // g1's stale unbind must not zap g2's live mapping.
    assert!(!table.unbind(host(9000), 7, g1));
    assert_eq!(table.resolve(host(9000), 7), Some(g2));

    assert!(table.unbind(host(9000), 7, g2));
    assert_eq!(table.resolve(host(9000), 7), None);
    assert!(table.is_empty());
}

#[test]
fn resolve_indexes_the_host_even_on_miss() {
    let mut table = LocalIdentityTable::new();
    assert_eq!(table.resolve(host(9000), 7), None);
    // We have now heard from this host.
    assert!(table.key_for(host(9000), 7).is_some());
}

#[test]
fn resolve_identity_reports_the_miss() {
    let mut registry = ObjectRegistry::new();
    registry.create(gid(1), TypeCode::Primitive, RegionId(1), host(9000), 7);

    assert_eq!(registry.resolve_identity(host(9000), 7), Ok(gid(1)));
    assert_eq!(
        registry.resolve_identity(host(9000), 8),
        Err(WorldError::UnresolvedIdentity {
            host_index: 1,
            local_id: 8,
        })
    );
}

#[test]
fn same_local_id_on_different_hosts_is_distinct() {
    let mut table = LocalIdentityTable::new();
    let g1 = gid(1);
    let g2 = gid(2);

    table.bind(g1, host(9000), 7);
    table.bind(g2, host(9001), 7);

    assert_eq!(table.resolve(host(9000), 7), Some(g1));
    assert_eq!(table.resolve(host(9001), 7), Some(g2));
}
