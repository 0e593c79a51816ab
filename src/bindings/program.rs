// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The consumed interface of a compiled program.

use super::argument::{ArgumentAccessor, ProgramArgument};
use super::argument_binding::ArgumentBinding;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// A compiled shader pipeline exposing a fixed set of named, stage-qualified
/// arguments.
///
/// Implemented by the pipeline-state layer, which is external to this crate;
/// we only consume the argument declarations and the embedded
/// [`SharedBindingCache`] through which Constant/FrameConstant bindings are
/// shared across all [`ProgramBindings`](super::ProgramBindings) instances of
/// the program.
pub trait Program: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Every argument the program declares, with access metadata.
    fn argument_accessors(&self) -> &[ArgumentAccessor];

    /// The cache this crate uses to share Constant/FrameConstant bindings.
    /// Implementations embed a `SharedBindingCache` and return it here.
    fn binding_cache(&self) -> &SharedBindingCache;

    fn arguments(&self) -> Vec<ProgramArgument> {
        self.argument_accessors()
            .iter()
            .map(|accessor| accessor.argument().clone())
            .collect()
    }

    fn find_argument_accessor(&self, argument: &ProgramArgument) -> Option<&ArgumentAccessor> {
        self.argument_accessors()
            .iter()
            .find(|accessor| accessor.argument() == argument)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    argument: ProgramArgument,
    /// None for Constant bindings, the frame index for FrameConstant ones.
    frame_index: Option<u32>,
}

/// Registry of shared argument bindings, one per program.
///
/// Constant bindings are keyed by argument; FrameConstant bindings by
/// argument plus frame index.  Entries are created on first use and then
/// handed out as the identical `Arc` to every later ProgramBindings of the
/// program, so a shared binding's views are assigned exactly once.
#[derive(Debug, Default)]
pub struct SharedBindingCache {
    inner: Mutex<HashMap<CacheKey, Arc<ArgumentBinding>>>,
}

impl SharedBindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached binding for the key, creating it with `create` if
    /// absent.  `create` may fail (for example on a kind mismatch while
    /// assigning initial views); the error propagates and nothing is cached.
    ///
    /// Only a bound binding is published into the cache.  A construction that
    /// ends up missing views fails its completeness check afterward, and
    /// caching the empty binding would make every retry receive it and fail
    /// the same way; an unpublished binding dies with the failed construction
    /// instead.
    pub(crate) fn get_or_create(
        &self,
        argument: &ProgramArgument,
        frame_index: Option<u32>,
        create: impl FnOnce() -> Result<Arc<ArgumentBinding>, super::Error>,
    ) -> Result<Arc<ArgumentBinding>, super::Error> {
        let key = CacheKey {
            argument: argument.clone(),
            frame_index,
        };
        let mut inner = self.inner.lock().expect("Failed to lock binding cache");
        if let Some(existing) = inner.get(&key) {
            return Ok(existing.clone());
        }
        let created = create()?;
        if created.is_bound() {
            inner.insert(key, created.clone());
        }
        Ok(created)
    }
}
