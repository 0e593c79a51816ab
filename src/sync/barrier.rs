// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Individual barrier records.

use crate::resources::{Resource, ResourceId, ResourceKind, ResourceState};
use std::sync::{Arc, Weak};

/// What a barrier transitions: tracked GPU state, or queue-family ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierKind {
    StateTransition,
    OwnerTransition,
}

/// Identity of a barrier inside a set.
///
/// At most one live barrier per id exists in a [`super::ResourceBarrierSet`];
/// adding another merges into the existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarrierId {
    pub resource: ResourceId,
    pub kind: BarrierKind,
}

/// The before/after payload of a barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierChange {
    State {
        before: ResourceState,
        after: ResourceState,
    },
    /// Queue-family ownership transfer.  `before == after` marks a
    /// neutralized record, see
    /// [`ResourceBarrierSet::remove`](super::ResourceBarrierSet::remove).
    Owner {
        before: u32,
        after: u32,
    },
}

/// One pending transition for one resource.
///
/// Holds a weak reference: a barrier never keeps its resource alive, and the
/// owning set drops state transitions whose resource dies, see
/// [`crate::resources::ReleaseSignal`].
#[derive(Debug, Clone)]
pub struct ResourceBarrier {
    id: BarrierId,
    resource: Weak<dyn Resource>,
    change: BarrierChange,
}

impl ResourceBarrier {
    /// Builds a state-transition barrier.
    ///
    /// # Panics
    ///
    /// Panics for sampler resources.  Samplers have no GPU state; requesting
    /// a barrier for one is a programming error, not a recoverable condition.
    pub fn state_transition(
        resource: &Arc<dyn Resource>,
        before: ResourceState,
        after: ResourceState,
    ) -> Self {
        assert_ne!(
            resource.resource_type(),
            ResourceKind::Sampler,
            "barrier requested for sampler {:?}; samplers have no state to transition",
            resource.name()
        );
        Self {
            id: BarrierId {
                resource: ResourceId::of(resource),
                kind: BarrierKind::StateTransition,
            },
            resource: Arc::downgrade(resource),
            change: BarrierChange::State { before, after },
        }
    }

    /// Builds a queue-family ownership-transfer barrier.
    ///
    /// # Panics
    ///
    /// Panics for sampler resources, as with
    /// [`state_transition`](Self::state_transition).
    pub fn owner_transition(resource: &Arc<dyn Resource>, before: u32, after: u32) -> Self {
        assert_ne!(
            resource.resource_type(),
            ResourceKind::Sampler,
            "ownership transfer requested for sampler {:?}",
            resource.name()
        );
        Self {
            id: BarrierId {
                resource: ResourceId::of(resource),
                kind: BarrierKind::OwnerTransition,
            },
            resource: Arc::downgrade(resource),
            change: BarrierChange::Owner { before, after },
        }
    }

    pub fn id(&self) -> BarrierId {
        self.id
    }

    pub fn change(&self) -> BarrierChange {
        self.change
    }

    /// The referenced resource, if still alive.
    pub fn resource(&self) -> Option<Arc<dyn Resource>> {
        self.resource.upgrade()
    }

    pub(crate) fn set_change(&mut self, change: BarrierChange) {
        self.change = change;
    }
}

/// Outcome of [`ResourceBarrierSet::add`](super::ResourceBarrierSet::add).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
    /// No barrier with this id existed; a new record was inserted.
    Added,
    /// A barrier with this id existed with a different payload; the record
    /// was refreshed in place, preserving its position.
    Updated,
    /// A barrier with this id and an identical payload already existed.
    Existing,
}
