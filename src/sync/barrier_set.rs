// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The keyed, mergeable barrier collection.

use super::barrier::{AddResult, BarrierChange, BarrierId, BarrierKind, ResourceBarrier};
use super::pipeline_stages::PipelineStages;
use crate::resources::{ReleaseSubscription, ResourceId};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

#[derive(Debug, Default)]
struct SetInner {
    //insertion order is submission order; merges must not reorder.
    barriers: SmallVec<[ResourceBarrier; 8]>,
    src_stages: PipelineStages,
    dst_stages: PipelineStages,
    subscriptions: HashMap<ResourceId, ReleaseSubscription>,
}

impl SetInner {
    fn position(&self, id: BarrierId) -> Option<usize> {
        self.barriers.iter().position(|b| b.id() == id)
    }

    /// Rebuilds the aggregate stage masks from scratch.
    ///
    /// Removal cannot subtract from the masks safely: another barrier may
    /// still require the stage, so the only correct update is a full union.
    fn recompute_stage_masks(&mut self) {
        let mut src = PipelineStages::empty();
        let mut dst = PipelineStages::empty();
        for barrier in &self.barriers {
            if let BarrierChange::State { before, after } = barrier.change() {
                src |= PipelineStages::for_state(before);
                dst |= PipelineStages::for_state(after);
            }
        }
        self.src_stages = src;
        self.dst_stages = dst;
    }

    fn drop_state_transition(&mut self, resource: ResourceId) -> bool {
        let id = BarrierId {
            resource,
            kind: BarrierKind::StateTransition,
        };
        let Some(index) = self.position(id) else {
            return false;
        };
        self.barriers.remove(index);
        self.subscriptions.remove(&resource);
        self.recompute_stage_masks();
        true
    }
}

/// A collection of pending resource transitions, keyed by
/// (resource, barrier kind).
///
/// Clones share the same underlying set.  All mutation is funneled through an
/// internal mutex, so concurrent readers of a shared resource observe one
/// serialized transition sequence.
#[derive(Debug, Clone, Default)]
pub struct ResourceBarrierSet {
    inner: Arc<Mutex<SetInner>>,
}

impl ResourceBarrierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or merges a barrier.
    ///
    /// A new id subscribes the set to the resource's release signal and
    /// extends the aggregate stage masks.  An existing id with a different
    /// payload is refreshed in place (ordering preserved); an identical
    /// payload is a no-op.
    ///
    /// Adding a barrier whose resource has already been released is ignored
    /// and reported as [`AddResult::Existing`]; the transition can no longer
    /// be submitted.
    pub fn add(&self, barrier: ResourceBarrier) -> AddResult {
        let id = barrier.id();
        let Some(resource) = barrier.resource() else {
            logwise::trace_sync!("Ignoring barrier for released resource");
            return AddResult::Existing;
        };

        //fast path: merge into an existing record.
        {
            let mut inner = self.inner.lock().expect("Failed to lock barrier set");
            if let Some(index) = inner.position(id) {
                if inner.barriers[index].change() == barrier.change() {
                    return AddResult::Existing;
                }
                inner.barriers[index].set_change(barrier.change());
                inner.recompute_stage_masks();
                return AddResult::Updated;
            }
        }

        //the subscription must be created outside the inner lock: a signal
        //that already fired invokes the callback immediately, and the
        //callback locks the set.
        let subscription = if id.kind == BarrierKind::StateTransition {
            let weak_inner: Weak<Mutex<SetInner>> = Arc::downgrade(&self.inner);
            let resource_id = id.resource;
            Some(resource.release_signal().subscribe(move || {
                if let Some(inner) = weak_inner.upgrade() {
                    let mut inner = inner.lock().expect("Failed to lock barrier set");
                    if inner.drop_state_transition(resource_id) {
                        logwise::trace_sync!("Dropped barrier for released resource");
                    }
                }
            }))
        } else {
            None
        };

        let mut inner = self.inner.lock().expect("Failed to lock barrier set");
        //racing adders may have inserted the id meanwhile
        if let Some(index) = inner.position(id) {
            if inner.barriers[index].change() == barrier.change() {
                return AddResult::Existing;
            }
            inner.barriers[index].set_change(barrier.change());
            inner.recompute_stage_masks();
            return AddResult::Updated;
        }
        if let BarrierChange::State { before, after } = barrier.change() {
            inner.src_stages |= PipelineStages::for_state(before);
            inner.dst_stages |= PipelineStages::for_state(after);
        }
        inner.barriers.push(barrier);
        if let Some(subscription) = subscription {
            inner.subscriptions.insert(id.resource, subscription);
        }
        AddResult::Added
    }

    /// Removes a barrier by id, returning whether one was present.
    ///
    /// State transitions are deleted outright and the stage masks are
    /// recomputed.  Ownership transitions are *neutralized* in place
    /// (before set equal to after) rather than deleted: the state half of a
    /// combined transition for the same resource may still be required, and
    /// backends treat a same-family record as a no-op.
    pub fn remove(&self, id: BarrierId) -> bool {
        let mut inner = self.inner.lock().expect("Failed to lock barrier set");
        match id.kind {
            BarrierKind::StateTransition => inner.drop_state_transition(id.resource),
            BarrierKind::OwnerTransition => {
                let Some(index) = inner.position(id) else {
                    return false;
                };
                let BarrierChange::Owner { after, .. } = inner.barriers[index].change() else {
                    unreachable!("owner id holds owner change");
                };
                inner.barriers[index].set_change(BarrierChange::Owner {
                    before: after,
                    after,
                });
                true
            }
        }
    }

    pub fn get(&self, id: BarrierId) -> Option<ResourceBarrier> {
        let inner = self.inner.lock().expect("Failed to lock barrier set");
        inner.position(id).map(|index| inner.barriers[index].clone())
    }

    /// Snapshot of the pending barriers in insertion order.
    pub fn barriers(&self) -> Vec<ResourceBarrier> {
        self.inner
            .lock()
            .expect("Failed to lock barrier set")
            .barriers
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("Failed to lock barrier set").barriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union of before-state stages across all state barriers.
    pub fn source_stages(&self) -> PipelineStages {
        self.inner.lock().expect("Failed to lock barrier set").src_stages
    }

    /// Union of after-state stages across all state barriers.
    pub fn destination_stages(&self) -> PipelineStages {
        self.inner.lock().expect("Failed to lock barrier set").dst_stages
    }

    /// Drops every barrier and subscription.  Used when a command list is
    /// reset for a new encode.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("Failed to lock barrier set");
        inner.barriers.clear();
        inner.subscriptions.clear();
        inner.src_stages = PipelineStages::empty();
        inner.dst_stages = PipelineStages::empty();
    }

    /// Recomputes the aggregate stage masks from the current records.
    ///
    /// Idempotent: recomputing twice yields the same masks as once.
    pub fn recompute_stage_masks(&self) {
        self.inner
            .lock()
            .expect("Failed to lock barrier set")
            .recompute_stage_masks();
    }
}
