// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Argument identity and access metadata.

use crate::resources::ResourceKind;
use std::sync::Arc;

/// Shader stage an argument is visible to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Compute,
    /// Visible to every stage.  Distinct from the per-stage variants for
    /// identity purposes: `(All, "x")` and `(Vertex, "x")` are different
    /// argument slots.
    All,
}

/// Identity of one shader-visible argument slot.
///
/// Equality and hashing are by (stage, name).  Names are interned as
/// `Arc<str>` so the many places that carry an argument (accessors, bindings,
/// error messages) share one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramArgument {
    stage: ShaderStage,
    name: Arc<str>,
}

impl ProgramArgument {
    pub fn new(stage: ShaderStage, name: impl Into<Arc<str>>) -> Self {
        Self {
            stage,
            name: name.into(),
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ProgramArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.stage, self.name)
    }
}

/// How often an argument's bound value changes.
///
/// This drives sharing: `Constant` bindings are shared across every
/// [`ProgramBindings`](super::ProgramBindings) of one program,
/// `FrameConstant` bindings are shared per frame index, and `Mutable`
/// bindings are private to each instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessType {
    Constant,
    FrameConstant,
    Mutable,
}

impl AccessType {
    pub fn mask(self) -> AccessTypeMask {
        match self {
            AccessType::Constant => AccessTypeMask::CONSTANT,
            AccessType::FrameConstant => AccessTypeMask::FRAME_CONSTANT,
            AccessType::Mutable => AccessTypeMask::MUTABLE,
        }
    }
}

bitflags::bitflags! {
    /// Subset of access types selected for a bulk operation such as
    /// [`ProgramBindings::apply_resource_states`](super::ProgramBindings::apply_resource_states).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessTypeMask: u8 {
        const CONSTANT       = 1 << 0;
        const FRAME_CONSTANT = 1 << 1;
        const MUTABLE        = 1 << 2;
    }
}

/// What kind of value an argument takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// One or more [`ResourceView`](crate::resources::ResourceView)s.
    ResourceView,
    /// A small constant written directly into the command stream; no view is
    /// bound and no barrier is ever required.
    RootConstant,
}

/// Full metadata for one declared argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentAccessor {
    argument: ProgramArgument,
    access: AccessType,
    value: ValueType,
    /// Declared resource kind; meaningful only for
    /// [`ValueType::ResourceView`] arguments.
    resource_kind: ResourceKind,
    /// Whether the argument is bound through a GPU address rather than a
    /// descriptor, where the backend supports it.
    addressable: bool,
}

impl ArgumentAccessor {
    pub fn new(
        argument: ProgramArgument,
        access: AccessType,
        value: ValueType,
        resource_kind: ResourceKind,
        addressable: bool,
    ) -> Self {
        Self {
            argument,
            access,
            value,
            resource_kind,
            addressable,
        }
    }

    /// Convenience constructor for the common view-valued, non-addressable
    /// case.
    pub fn view(argument: ProgramArgument, access: AccessType, resource_kind: ResourceKind) -> Self {
        Self::new(argument, access, ValueType::ResourceView, resource_kind, false)
    }

    pub fn argument(&self) -> &ProgramArgument {
        &self.argument
    }

    pub fn access(&self) -> AccessType {
        self.access
    }

    pub fn value(&self) -> ValueType {
        self.value
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.resource_kind
    }

    pub fn addressable(&self) -> bool {
        self.addressable
    }
}
