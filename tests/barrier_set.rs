// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Merge, removal, and release-tracking semantics of the barrier set.

mod common;

use common::{TestResource, as_resource};
use lists_and_barriers::resources::{ResourceId, ResourceState};
use lists_and_barriers::sync::{
    AddResult, BarrierChange, BarrierId, BarrierKind, PipelineStages, ResourceBarrier,
    ResourceBarrierSet,
};

#[test]
fn add_inserts_then_merges() {
    let texture = as_resource(&TestResource::texture("t"));
    let set = ResourceBarrierSet::new();

    let result = set.add(ResourceBarrier::state_transition(
        &texture,
        ResourceState::Common,
        ResourceState::ShaderResource,
    ));
    assert_eq!(result, AddResult::Added);
    assert_eq!(set.len(), 1);

    //identical payload: no-op
    let result = set.add(ResourceBarrier::state_transition(
        &texture,
        ResourceState::Common,
        ResourceState::ShaderResource,
    ));
    assert_eq!(result, AddResult::Existing);
    assert_eq!(set.len(), 1);

    //same id, different payload: refreshed in place
    let result = set.add(ResourceBarrier::state_transition(
        &texture,
        ResourceState::ShaderResource,
        ResourceState::CopyDest,
    ));
    assert_eq!(result, AddResult::Updated);
    assert_eq!(set.len(), 1);
    let id = BarrierId {
        resource: ResourceId::of(&texture),
        kind: BarrierKind::StateTransition,
    };
    assert_eq!(
        set.get(id).map(|barrier| barrier.change()),
        Some(BarrierChange::State {
            before: ResourceState::ShaderResource,
            after: ResourceState::CopyDest,
        })
    );
}

#[test]
fn merge_preserves_insertion_order() {
    let a = as_resource(&TestResource::texture("a"));
    let b = as_resource(&TestResource::texture("b"));
    let set = ResourceBarrierSet::new();
    set.add(ResourceBarrier::state_transition(
        &a,
        ResourceState::Common,
        ResourceState::ShaderResource,
    ));
    set.add(ResourceBarrier::state_transition(
        &b,
        ResourceState::Common,
        ResourceState::CopyDest,
    ));
    //refreshing `a` must not move it behind `b`
    set.add(ResourceBarrier::state_transition(
        &a,
        ResourceState::ShaderResource,
        ResourceState::RenderTarget,
    ));
    let ids: Vec<_> = set.barriers().iter().map(|barrier| barrier.id().resource).collect();
    assert_eq!(ids, vec![ResourceId::of(&a), ResourceId::of(&b)]);
}

#[test]
fn state_and_owner_barriers_coexist_for_one_resource() {
    let buffer = as_resource(&TestResource::buffer("b"));
    let set = ResourceBarrierSet::new();
    assert_eq!(
        set.add(ResourceBarrier::state_transition(
            &buffer,
            ResourceState::Common,
            ResourceState::CopySource,
        )),
        AddResult::Added
    );
    assert_eq!(
        set.add(ResourceBarrier::owner_transition(&buffer, 0, 1)),
        AddResult::Added
    );
    assert_eq!(set.len(), 2);
}

#[test]
fn remove_state_transition_deletes_and_recomputes_masks() {
    let a = as_resource(&TestResource::texture("a"));
    let b = as_resource(&TestResource::buffer("b"));
    let set = ResourceBarrierSet::new();
    set.add(ResourceBarrier::state_transition(
        &a,
        ResourceState::Common,
        ResourceState::RenderTarget,
    ));
    set.add(ResourceBarrier::state_transition(
        &b,
        ResourceState::CopyDest,
        ResourceState::ShaderResource,
    ));
    assert!(set.destination_stages().contains(PipelineStages::COLOR_OUTPUT));

    let removed = set.remove(BarrierId {
        resource: ResourceId::of(&a),
        kind: BarrierKind::StateTransition,
    });
    assert!(removed);
    assert_eq!(set.len(), 1);
    //the render-target contribution is gone, the remaining barrier's is not
    assert!(!set.destination_stages().contains(PipelineStages::COLOR_OUTPUT));
    assert_eq!(set.source_stages(), PipelineStages::TRANSFER);
    assert_eq!(
        set.destination_stages(),
        PipelineStages::VERTEX_SHADER
            | PipelineStages::PIXEL_SHADER
            | PipelineStages::COMPUTE_SHADER
    );

    //removing again reports absence
    assert!(!set.remove(BarrierId {
        resource: ResourceId::of(&a),
        kind: BarrierKind::StateTransition,
    }));
}

#[test]
fn recompute_stage_masks_is_idempotent() {
    let texture = as_resource(&TestResource::texture("t"));
    let set = ResourceBarrierSet::new();
    set.add(ResourceBarrier::state_transition(
        &texture,
        ResourceState::Undefined,
        ResourceState::ShaderResource,
    ));
    set.recompute_stage_masks();
    let src = set.source_stages();
    let dst = set.destination_stages();
    set.recompute_stage_masks();
    assert_eq!(set.source_stages(), src);
    assert_eq!(set.destination_stages(), dst);
}

#[test]
fn remove_owner_transition_neutralizes_in_place() {
    let buffer = as_resource(&TestResource::buffer("b"));
    let set = ResourceBarrierSet::new();
    set.add(ResourceBarrier::owner_transition(&buffer, 0, 1));
    let id = BarrierId {
        resource: ResourceId::of(&buffer),
        kind: BarrierKind::OwnerTransition,
    };

    assert!(set.remove(id));
    //the record survives with before == after, a no-op for backends
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.get(id).map(|barrier| barrier.change()),
        Some(BarrierChange::Owner { before: 1, after: 1 })
    );

    //a later add revives the record by merging
    assert_eq!(
        set.add(ResourceBarrier::owner_transition(&buffer, 1, 2)),
        AddResult::Updated
    );
    assert_eq!(
        set.get(id).map(|barrier| barrier.change()),
        Some(BarrierChange::Owner { before: 1, after: 2 })
    );
}

#[test]
fn released_resource_drops_its_state_barrier() {
    let set = ResourceBarrierSet::new();
    let texture = TestResource::texture("short_lived");
    set.add(ResourceBarrier::state_transition(
        &as_resource(&texture),
        ResourceState::Common,
        ResourceState::ShaderResource,
    ));
    assert_eq!(set.len(), 1);
    drop(texture);
    assert!(set.is_empty());
    assert_eq!(set.source_stages(), PipelineStages::empty());
    assert_eq!(set.destination_stages(), PipelineStages::empty());
}

#[test]
fn add_for_already_released_resource_is_ignored() {
    let texture = TestResource::texture("gone");
    let barrier = ResourceBarrier::state_transition(
        &as_resource(&texture),
        ResourceState::Common,
        ResourceState::ShaderResource,
    );
    drop(texture);
    let set = ResourceBarrierSet::new();
    assert_eq!(set.add(barrier), AddResult::Existing);
    assert!(set.is_empty());
}

#[test]
#[should_panic(expected = "samplers have no state to transition")]
fn sampler_state_barrier_panics() {
    let sampler = as_resource(&TestResource::sampler("s"));
    let _ = ResourceBarrier::state_transition(
        &sampler,
        ResourceState::Common,
        ResourceState::ShaderResource,
    );
}

#[test]
#[should_panic(expected = "ownership transfer requested for sampler")]
fn sampler_owner_barrier_panics() {
    let sampler = as_resource(&TestResource::sampler("s"));
    let _ = ResourceBarrier::owner_transition(&sampler, 0, 1);
}

#[test]
fn clear_empties_everything() {
    let texture = as_resource(&TestResource::texture("t"));
    let set = ResourceBarrierSet::new();
    set.add(ResourceBarrier::state_transition(
        &texture,
        ResourceState::Common,
        ResourceState::ShaderResource,
    ));
    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.source_stages(), PipelineStages::empty());
    assert_eq!(set.destination_stages(), PipelineStages::empty());
}

#[test]
fn clones_share_one_set() {
    let texture = as_resource(&TestResource::texture("t"));
    let set = ResourceBarrierSet::new();
    let alias = set.clone();
    alias.add(ResourceBarrier::state_transition(
        &texture,
        ResourceState::Common,
        ResourceState::ShaderResource,
    ));
    assert_eq!(set.len(), 1);
}
