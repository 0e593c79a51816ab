// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! The capability seam between the portable core and a native API.

Each backend variant (D3D12-style, Vulkan-style, Metal-style) implements
[`Backend`] exactly once; the core dispatches through `Arc<dyn Backend>` and
never branches on backend kind.  The [`nop`] implementation satisfies the
trait with no native API behind it, for tests and headless operation.
*/

pub mod nop;

use crate::bindings::ArgumentAccessor;
use crate::lists::CommandList;
use crate::sync::ResourceBarrier;

/// Backend handle for one materialized argument binding (a descriptor-table
/// entry, descriptor-set write, or argument-buffer slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeBinding(pub u64);

/// Backend handle for one translated barrier record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeBarrier(pub u64);

/// Identifies one submission for completion polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

/// Native-call failure surfaced during translation or submission.  Fatal:
/// there is no retry in this core; device-loss recovery belongs to the
/// backend layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("barrier translation failed: {detail}")]
    BarrierTranslation { detail: String },
    #[error("native binding creation failed: {detail}")]
    BindingCreation { detail: String },
}

/// What the core needs from a native graphics API.
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Materializes an argument binding for the backend's binding model.
    fn create_native_binding(&self, accessor: &ArgumentAccessor) -> NativeBinding;

    /// Translates a portable barrier into the backend's record.  Backends
    /// with implicit hazard tracking may return a trivial record.
    fn translate_barrier(&self, barrier: &ResourceBarrier) -> Result<NativeBarrier, BackendError>;

    /// Hands a committed list's encoded stream to the native queue.
    fn submit(&self, list: &CommandList) -> Ticket;

    /// True once the GPU work behind `ticket` has finished.
    fn poll_completion(&self, ticket: Ticket) -> bool;
}
