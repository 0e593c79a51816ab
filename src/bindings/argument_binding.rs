// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! One argument slot and the views bound to it.

use super::argument::{AccessType, ArgumentAccessor, ValueType};
use crate::backend::{Backend, NativeBinding};
use crate::resources::{Resource, ResourceKind, ResourceState, ResourceView};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct BindingInner {
    views: SmallVec<[ResourceView; 1]>,
    native: Option<NativeBinding>,
}

/// One (shader stage, name) slot holding zero or more resource views plus
/// access metadata.
///
/// Shared (Constant/FrameConstant) instances live in the program's
/// [`SharedBindingCache`](super::SharedBindingCache) and are referenced by
/// many [`ProgramBindings`](super::ProgramBindings); their views are assigned
/// once at construction and never again.  Mutable instances are private to
/// one ProgramBindings and may be re-assigned between frames.
#[derive(Debug)]
pub struct ArgumentBinding {
    accessor: ArgumentAccessor,
    inner: Mutex<BindingInner>,
}

impl ArgumentBinding {
    pub fn new(accessor: ArgumentAccessor) -> Self {
        Self {
            accessor,
            inner: Mutex::new(BindingInner::default()),
        }
    }

    pub fn accessor(&self) -> &ArgumentAccessor {
        &self.accessor
    }

    /// Assigns the bound views, validating each view's resource kind against
    /// the argument's declared kind.
    ///
    /// # Panics
    ///
    /// Panics when re-assigning a shared (Constant/FrameConstant) binding
    /// that already has views: sharing means every referencing
    /// ProgramBindings would observe the mutation mid-apply.
    pub fn set_views(&self, views: &[ResourceView]) -> Result<(), super::Error> {
        let mut inner = self.inner.lock().expect("Failed to lock argument binding");
        assert!(
            self.accessor.access() == AccessType::Mutable || inner.views.is_empty(),
            "shared binding {} is assigned once at construction",
            self.accessor.argument()
        );
        for view in views {
            let resource = view.resource().ok_or_else(|| super::Error::ResourceReleased {
                argument: self.accessor.argument().to_string(),
            })?;
            let actual = resource.resource_type();
            if actual != self.accessor.resource_kind() {
                return Err(super::Error::KindMismatch {
                    argument: self.accessor.argument().to_string(),
                    expected: self.accessor.resource_kind(),
                    actual,
                });
            }
        }
        inner.views = views.iter().cloned().collect();
        Ok(())
    }

    /// Drops the bound views.  Only legal for Mutable bindings; used when a
    /// ProgramBindings instance rebinds per-instance resources.
    pub fn clear_views(&self) {
        assert_eq!(
            self.accessor.access(),
            AccessType::Mutable,
            "shared binding {} cannot be unbound",
            self.accessor.argument()
        );
        self.inner
            .lock()
            .expect("Failed to lock argument binding")
            .views
            .clear();
    }

    pub fn views(&self) -> Vec<ResourceView> {
        self.inner
            .lock()
            .expect("Failed to lock argument binding")
            .views
            .iter()
            .cloned()
            .collect()
    }

    /// Whether the slot satisfies the completeness check.  Root constants
    /// carry their value in the command stream and never need a view.
    pub fn is_bound(&self) -> bool {
        self.accessor.value() == ValueType::RootConstant
            || !self
                .inner
                .lock()
                .expect("Failed to lock argument binding")
                .views
                .is_empty()
    }

    /// The GPU state the given bound resource must be in for this argument.
    ///
    /// Constant-accessed buffers are read through the constant-buffer path;
    /// depth-stencil textures are sampled in depth-read state; everything
    /// else is a plain shader resource.  Samplers have no state, so None.
    pub fn target_state(&self, resource: &Arc<dyn Resource>) -> Option<ResourceState> {
        match resource.resource_type() {
            ResourceKind::Sampler => None,
            ResourceKind::Buffer
                if matches!(
                    self.accessor.access(),
                    AccessType::Constant | AccessType::FrameConstant
                ) =>
            {
                Some(ResourceState::ConstantBufferRead)
            }
            ResourceKind::Texture if resource.is_depth_stencil() => Some(ResourceState::DepthRead),
            _ => Some(ResourceState::ShaderResource),
        }
    }

    /// The backend handle for this slot, created on first use.
    pub fn native_binding(&self, backend: &Arc<dyn Backend>) -> NativeBinding {
        let mut inner = self.inner.lock().expect("Failed to lock argument binding");
        match inner.native {
            Some(native) => native,
            None => {
                let native = backend.create_native_binding(&self.accessor);
                inner.native = Some(native);
                native
            }
        }
    }
}

// Value equality compares metadata and bound views; used to verify that a
// copy's Mutable bindings match the source while shared bindings stay the
// identical object.
impl PartialEq for ArgumentBinding {
    fn eq(&self, other: &Self) -> bool {
        self.accessor == other.accessor && self.views() == other.views()
    }
}
impl Eq for ArgumentBinding {}
