// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Named debug scopes for command-list encoding.

/// A named scope token pushed onto a command list's debug-group stack.
///
/// Groups exist purely for capture/debug tooling; they nest, and the stack is
/// mutated only while the owning list is encoding.  A reset closes any
/// nesting the previous encode left open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugGroup {
    name: String,
}

impl DebugGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for DebugGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
