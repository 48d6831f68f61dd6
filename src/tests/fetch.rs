use std::collections::HashMap;

use crate::fetch::{
    AttributeFetchQueue, AttributeKind, AttributeResponse, CostAttributes, MAX_ATTRIBUTE_BATCH,
};
use crate::tests::{gid, host, MockRenderer, MockTransport};
use crate::types::{RegionId, TypeCode};
use crate::world::WorldSync;

#[test]
fn flush_moves_stale_ids_into_one_pending_batch() {
    let mut queue = AttributeFetchQueue::new(AttributeKind::Cost);
    let mut transport = MockTransport::new();
    for n in 1..=150u128 {
        queue.mark_stale(gid(n));
    }

    queue.flush(&mut transport);

    assert_eq!(transport.batches.len(), 1);
    let (kind, ids) = &transport.batches[0];
    assert_eq!(*kind, AttributeKind::Cost);
    assert_eq!(ids.len(), 150);
    assert_eq!(queue.stale_len(), 0);
    assert_eq!(queue.pending_len(), 150);
}

#[test]
fn flush_caps_each_batch_and_leaves_the_rest_stale() {
    let mut queue = AttributeFetchQueue::new(AttributeKind::Physics);
    let mut transport = MockTransport::new();
    for n in 1..=300u128 {
        queue.mark_stale(gid(n));
    }

    queue.flush(&mut transport);
    assert_eq!(transport.batches[0].1.len(), MAX_ATTRIBUTE_BATCH);
    assert_eq!(queue.stale_len(), 300 - MAX_ATTRIBUTE_BATCH);

    // The overflow goes out on the next frame.
    queue.flush(&mut transport);
    assert_eq!(transport.batches[1].1.len(), 300 - MAX_ATTRIBUTE_BATCH);
    assert_eq!(queue.stale_len(), 0);
    assert_eq!(queue.pending_len(), 300);
}

#[test]
fn in_flight_ids_cannot_be_remarked_stale() {
    let mut queue = AttributeFetchQueue::new(AttributeKind::Cost);
    let mut transport = MockTransport::new();
    let id = gid(1);

    queue.mark_stale(id);
    queue.flush(&mut transport);
    assert!(queue.is_pending(id));

    // A stale mark while the request is in flight is swallowed.
    queue.mark_stale(id);
    assert_eq!(queue.stale_len(), 0);

    // Completion reopens the id.
    assert!(queue.complete(id));
    queue.mark_stale(id);
    assert!(queue.is_stale(id));
}

#[test]
fn failed_batches_are_released_but_not_requeued() {
    let mut queue = AttributeFetchQueue::new(AttributeKind::Cost);
    let mut transport = MockTransport::new();
    queue.mark_stale(gid(1));
    queue.mark_stale(gid(2));
    queue.flush(&mut transport);

    let requested = transport.batches[0].1.clone();
    queue.fail_batch(&requested);

    assert_eq!(queue.pending_len(), 0);
    assert_eq!(queue.stale_len(), 0);

    // Only an explicit new mark retries.
    queue.mark_stale(gid(1));
    assert!(queue.is_stale(gid(1)));
}

#[test]
fn cost_response_applies_data_and_releases_absent_ids() {
    let mut world = WorldSync::new();
    let mut transport = MockTransport::new();
    world
        .registry_mut()
        .create(gid(1), TypeCode::Primitive, RegionId(1), host(9000), 1);
    world
        .registry_mut()
        .create(gid(2), TypeCode::Primitive, RegionId(1), host(9000), 2);

    world.mark_cost_stale(gid(1));
    world.mark_cost_stale(gid(2));
    world.frame(&mut transport);
    let requested = transport.batches[0].1.clone();

    let mut results = HashMap::new();
    results.insert(
        gid(1),
        CostAttributes {
            object_cost: 1.5,
            linkset_cost: 3.0,
            physics_cost: 0.5,
            linkset_physics_cost: 1.0,
        },
    );
    world.handle_cost_response(AttributeResponse { requested, results });

    let fetched = world.registry().get(&gid(1)).unwrap().cost().unwrap();
    assert_eq!(fetched.linkset_cost, 3.0);
    // The id the server stayed silent on carries no data but is no longer
    // in flight.
    assert!(world.registry().get(&gid(2)).unwrap().cost().is_none());
    assert_eq!(world.cost_queue().pending_len(), 0);
}

#[test]
fn response_for_a_killed_object_is_dropped_quietly() {
    let mut world = WorldSync::new();
    let mut transport = MockTransport::new();
    let mut renderer = MockRenderer::new();
    world
        .registry_mut()
        .create(gid(1), TypeCode::Primitive, RegionId(1), host(9000), 1);

    world.mark_cost_stale(gid(1));
    world.frame(&mut transport);
    world.kill(gid(1), &mut renderer);

    let requested = transport.batches[0].1.clone();
    world.handle_cost_response(AttributeResponse {
        requested,
        results: HashMap::new(),
    });
    assert_eq!(world.cost_queue().pending_len(), 0);
}

#[test]
fn marking_a_child_cost_stale_also_marks_its_parent() {
    let mut world = WorldSync::new();
    world
        .registry_mut()
        .create(gid(1), TypeCode::Primitive, RegionId(1), host(9000), 1);
    world
        .registry_mut()
        .create(gid(2), TypeCode::Primitive, RegionId(1), host(9000), 2);
    world.registry_mut().get_mut(&gid(2)).unwrap().parent = Some(gid(1));

    world.mark_cost_stale(gid(2));

    assert!(world.cost_queue().is_stale(gid(2)));
    assert!(world.cost_queue().is_stale(gid(1)));
    assert_eq!(world.cost_queue().stale_len(), 2);
}

#[test]
fn frame_flushes_both_queues() {
    let mut world = WorldSync::new();
    let mut transport = MockTransport::new();
    world
        .registry_mut()
        .create(gid(1), TypeCode::Primitive, RegionId(1), host(9000), 1);

    world.mark_cost_stale(gid(1));
    world.mark_physics_stale(gid(1));
    world.frame(&mut transport);

    assert_eq!(transport.batches.len(), 2);
    assert_eq!(transport.batches[0].0, AttributeKind::Cost);
    assert_eq!(transport.batches[1].0, AttributeKind::Physics);
    assert_eq!(world.physics_queue().pending_len(), 1);
}
