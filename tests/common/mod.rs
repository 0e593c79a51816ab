// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Shared fixtures: a resource provider and a program, backed by the nop
//! backend.
#![allow(dead_code)]

use lists_and_barriers::bindings::{ArgumentAccessor, Program, SharedBindingCache};
use lists_and_barriers::resources::{
    ReleaseSignal, Resource, ResourceKind, ResourceState, ResourceView,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct TestResource {
    name: String,
    kind: ResourceKind,
    depth_stencil: bool,
    state: Mutex<ResourceState>,
    owner: Mutex<Option<u32>>,
    release: ReleaseSignal,
}

impl TestResource {
    fn new(
        name: &str,
        kind: ResourceKind,
        depth_stencil: bool,
        state: ResourceState,
        owner: Option<u32>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            kind,
            depth_stencil,
            state: Mutex::new(state),
            owner: Mutex::new(owner),
            release: ReleaseSignal::new(),
        })
    }

    pub fn buffer(name: &str) -> Arc<Self> {
        Self::new(name, ResourceKind::Buffer, false, ResourceState::Common, None)
    }

    pub fn buffer_in_state(name: &str, state: ResourceState) -> Arc<Self> {
        Self::new(name, ResourceKind::Buffer, false, state, None)
    }

    pub fn texture(name: &str) -> Arc<Self> {
        Self::new(name, ResourceKind::Texture, false, ResourceState::Common, None)
    }

    pub fn depth_texture(name: &str) -> Arc<Self> {
        Self::new(name, ResourceKind::Texture, true, ResourceState::Common, None)
    }

    pub fn sampler(name: &str) -> Arc<Self> {
        Self::new(name, ResourceKind::Sampler, false, ResourceState::Common, None)
    }

    pub fn owned_by(name: &str, kind: ResourceKind, family: u32) -> Arc<Self> {
        Self::new(name, kind, false, ResourceState::Common, Some(family))
    }
}

impl Resource for TestResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> ResourceKind {
        self.kind
    }

    fn state(&self) -> ResourceState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: ResourceState) -> bool {
        let mut current = self.state.lock().unwrap();
        let changed = *current != state;
        *current = state;
        changed
    }

    fn owner_queue_family(&self) -> Option<u32> {
        *self.owner.lock().unwrap()
    }

    fn set_owner_queue_family(&self, family: u32) -> bool {
        let mut current = self.owner.lock().unwrap();
        let changed = *current != Some(family);
        *current = Some(family);
        changed
    }

    fn is_depth_stencil(&self) -> bool {
        self.depth_stencil
    }

    fn release_signal(&self) -> &ReleaseSignal {
        &self.release
    }
}

impl Drop for TestResource {
    fn drop(&mut self) {
        self.release.notify_released();
    }
}

/// Coerces to the trait object the crate's APIs take.
pub fn as_resource(resource: &Arc<TestResource>) -> Arc<dyn Resource> {
    resource.clone()
}

pub fn view_of(resource: &Arc<TestResource>) -> ResourceView {
    ResourceView::new(&as_resource(resource))
}

#[derive(Debug)]
pub struct TestProgram {
    name: String,
    accessors: Vec<ArgumentAccessor>,
    cache: SharedBindingCache,
}

impl TestProgram {
    pub fn new(name: &str, accessors: Vec<ArgumentAccessor>) -> Arc<dyn Program> {
        Arc::new(Self {
            name: name.to_string(),
            accessors,
            cache: SharedBindingCache::new(),
        })
    }
}

impl Program for TestProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn argument_accessors(&self) -> &[ArgumentAccessor] {
        &self.accessors
    }

    fn binding_cache(&self) -> &SharedBindingCache {
        &self.cache
    }
}

pub fn views_map(
    entries: &[(
        &lists_and_barriers::bindings::ProgramArgument,
        &Arc<TestResource>,
    )],
) -> HashMap<lists_and_barriers::bindings::ProgramArgument, Vec<ResourceView>> {
    entries
        .iter()
        .map(|(argument, resource)| ((*argument).clone(), vec![view_of(resource)]))
        .collect()
}
