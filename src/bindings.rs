// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Binds shader-visible resources to program arguments.

The underlying APIs disagree on the binding model (descriptor tables vs.
descriptor sets vs. argument buffers), so this layer speaks only in
(shader stage, name) argument slots and lets the backend materialize native
bindings from them.
*/

pub mod argument;
mod argument_binding;
pub mod program;
mod program_bindings;

pub use argument::{
    AccessType, AccessTypeMask, ArgumentAccessor, ProgramArgument, ShaderStage, ValueType,
};
pub use argument_binding::ArgumentBinding;
pub use program::{Program, SharedBindingCache};
pub use program_bindings::ProgramBindings;

use crate::resources::ResourceKind;

/// Binding-layer errors.  All of these are programming preconditions: they
/// are raised synchronously, before any GPU work is queued, and are never
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more declared arguments have no bound view.  Raised by
    /// [`ProgramBindings::new`] immediately after construction, naming every
    /// missing argument.
    #[error("program arguments not bound: {}", arguments.join(", "))]
    UnboundArguments { arguments: Vec<String> },

    /// A view's resource kind does not match the argument's declared kind.
    #[error("argument {argument} expects a {expected:?} resource, got {actual:?}")]
    KindMismatch {
        argument: String,
        expected: ResourceKind,
        actual: ResourceKind,
    },

    /// A view references a resource that has already been released.
    #[error("resource bound to argument {argument} was released")]
    ResourceReleased { argument: String },
}
