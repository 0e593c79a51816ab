// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource-provider interface consumed by the binding and barrier layers.
//!
//! This crate does not create buffers, textures, or samplers; a resource
//! provider (typically the backend's object wrappers) implements [`Resource`]
//! and the core consumes it through narrow methods: kind, current GPU state,
//! owner queue family, and a release signal.
//!
//! # Views
//!
//! A [`ResourceView`] is how a resource participates in argument binding.  It
//! holds a *weak* reference plus an optional sub-range; it never owns the
//! resource.  During execution a view may be "retained" (upgraded to a strong
//! reference) to extend the resource's lifetime until the owning command list
//! returns to pending, see
//! [`ApplyBehavior::RETAIN_RESOURCES`](crate::lists::ApplyBehavior).
//!
//! # Release tracking
//!
//! Providers embed a [`ReleaseSignal`] and fire it when the native resource is
//! destroyed.  Barrier sets subscribe to it so that a pending transition for a
//! dead resource is dropped instead of dereferenced, see
//! [`crate::sync::ResourceBarrierSet`].

mod release_tracking;

pub use release_tracking::{ReleaseSignal, ReleaseSubscription};

use std::fmt::Debug;
use std::sync::{Arc, Weak};

/// The kinds of GPU resource an argument can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    Texture,
    Sampler,
}

/// GPU state a resource can be transitioned to.
///
/// This is the backend-independent vocabulary; each backend translates these
/// into its own layout/access pairs (or ignores them entirely when the native
/// API tracks hazards implicitly).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Initial state of a freshly created resource; contents undefined.
    Undefined,
    /// The API's default/common state.
    Common,
    /// Read as a constant (uniform) buffer from any shader stage.
    ConstantBufferRead,
    /// Read as a shader resource (sampled texture or storage read).
    ShaderResource,
    /// Written as a color render target.
    RenderTarget,
    /// Written as a depth-stencil attachment.
    DepthWrite,
    /// Read as a depth-stencil attachment or depth texture.
    DepthRead,
    CopySource,
    CopyDest,
    /// Presented to a swapchain.
    Present,
}

/// Interface of a GPU resource as seen by the binding and barrier layers.
///
/// State and ownership setters return whether anything changed; the caller
/// uses that to decide whether a barrier is required.  Implementations are
/// expected to answer these from cheap internal bookkeeping (an atomic or a
/// small mutex), not from a native API query.
pub trait Resource: Send + Sync + Debug {
    /// Debug name, used in logs and panic messages.
    fn name(&self) -> &str;

    fn resource_type(&self) -> ResourceKind;

    /// Current tracked GPU state.
    fn state(&self) -> ResourceState;

    /// Records a new tracked state, returning true if it differed from the
    /// previous one.
    fn set_state(&self, state: ResourceState) -> bool;

    /// Queue family that currently owns the resource, if the backend tracks
    /// exclusive ownership.
    fn owner_queue_family(&self) -> Option<u32>;

    /// Records a new owning queue family, returning true if ownership moved.
    fn set_owner_queue_family(&self, family: u32) -> bool;

    /// True for textures created with a depth-stencil format.  Used to pick
    /// the depth-read target state over the generic shader-resource one.
    fn is_depth_stencil(&self) -> bool {
        false
    }

    /// The release signal the provider fires when the native object dies.
    fn release_signal(&self) -> &ReleaseSignal;
}

/// Identity of a resource, stable for the life of its `Arc`.
///
/// Derived from the allocation address; valid only while some `Arc` to the
/// resource is alive, which the barrier set's release tracking guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(usize);

impl ResourceId {
    pub fn of(resource: &Arc<dyn Resource>) -> Self {
        ResourceId(Arc::as_ptr(resource) as *const () as usize)
    }
}

/// A non-owning reference to a resource plus an optional sub-range.
///
/// Views are the values bound to program arguments.  Equality compares the
/// referenced resource (by pointer) and the sub-range.
#[derive(Debug, Clone)]
pub struct ResourceView {
    resource: Weak<dyn Resource>,
    offset: usize,
    size: Option<usize>,
}

impl ResourceView {
    /// A view of the whole resource.
    pub fn new(resource: &Arc<dyn Resource>) -> Self {
        Self {
            resource: Arc::downgrade(resource),
            offset: 0,
            size: None,
        }
    }

    /// A view of a sub-range.  `size` of None means "to the end".
    pub fn with_range(resource: &Arc<dyn Resource>, offset: usize, size: Option<usize>) -> Self {
        Self {
            resource: Arc::downgrade(resource),
            offset,
            size,
        }
    }

    /// Upgrades to the referenced resource, or None if it was released.
    pub fn resource(&self) -> Option<Arc<dyn Resource>> {
        self.resource.upgrade()
    }

    pub(crate) fn resource_weak(&self) -> &Weak<dyn Resource> {
        &self.resource
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> Option<usize> {
        self.size
    }
}

impl PartialEq for ResourceView {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.resource, &other.resource)
            && self.offset == other.offset
            && self.size == other.size
    }
}
impl Eq for ResourceView {}
