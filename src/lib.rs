/*! lists_and_barriers is the backend-independent command-list lifecycle and
resource-synchronization core of a GPU middleware stack.

Native graphics APIs disagree on almost everything this crate touches:

| Concern         | D3D12-style          | Vulkan-style           | Metal-style        |
|-----------------|----------------------|------------------------|--------------------|
| Binding model   | Descriptor tables    | Descriptor sets        | Argument buffers   |
| Synchronization | Resource states      | Pipeline barriers + queue-family ownership | Implicit hazard tracking |
| Submission      | Queues + fences      | Queues + semaphores    | Command queues     |

The portable contract this crate presents over all of them:

1.  **Bindings** ([`bindings`]): resources are bound to (shader stage, name)
    argument slots.  Binding-change frequency metadata
    (Constant / FrameConstant / Mutable) drives sharing, so one set of shared
    bindings can back many per-instance binding objects without duplication
    or re-validation.
2.  **Barriers** ([`sync`]): every state or queue-ownership change is funneled
    through a keyed, mergeable [`sync::ResourceBarrierSet`], so concurrent
    readers of a resource observe one serialized transition sequence.
3.  **Lifecycle** ([`lists`]): a [`lists::CommandList`] moves through
    Pending → Encoding → Committed → Executing and back, with out-of-order
    transitions treated as fatal programming errors rather than corrupted
    command streams.

What this crate deliberately does not do: shader compilation, pipeline-state
construction, window/platform glue, and the native object wrappers themselves.
Those live behind the narrow traits in [`backend`], [`resources`], and
[`bindings::program`]; the core consumes capabilities and never branches on
backend kind.

# Threading

One worker thread encodes into one command list.  Encoding calls are
synchronous and non-blocking; the only blocking operation in the crate is
[`lists::CommandList::wait_until_completed`].  Within one list, GPU execution
order equals encode call order; across a [`lists::CommandListSet`],
submission order equals member order.
*/

pub mod backend;
pub mod bindings;
pub mod lists;
pub mod resources;
pub mod sync;
