// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Aggregates every argument binding for one instantiation of a program.

use super::argument::{AccessType, AccessTypeMask, ProgramArgument, ValueType};
use super::argument_binding::ArgumentBinding;
use super::program::Program;
use crate::resources::{Resource, ResourceState, ResourceView};
use crate::sync::{ResourceBarrier, ResourceBarrierSet};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::sync::Mutex;

type TransitionEntry = (Weak<dyn Resource>, ResourceState);

/// (resource, target state) pairs bucketed by access type, rebuilt whenever
/// views change.  Kept separate from the bindings map so that apply walks a
/// flat list instead of re-deriving targets per call.
#[derive(Debug, Default)]
struct TransitionBuckets {
    constant: Vec<TransitionEntry>,
    frame_constant: Vec<TransitionEntry>,
    mutable: Vec<TransitionEntry>,
}

impl TransitionBuckets {
    fn bucket_mut(&mut self, access: AccessType) -> &mut Vec<TransitionEntry> {
        match access {
            AccessType::Constant => &mut self.constant,
            AccessType::FrameConstant => &mut self.frame_constant,
            AccessType::Mutable => &mut self.mutable,
        }
    }

    fn clear(&mut self) {
        self.constant.clear();
        self.frame_constant.clear();
        self.mutable.clear();
    }
}

/// All argument bindings for one (program, frame index) instantiation.
///
/// Created once per instantiation and cheaply copied with selective resource
/// replacement via [`create_copy`](Self::create_copy): shared
/// Constant/FrameConstant bindings are reused as the identical `Arc`, only
/// Mutable bindings are re-instantiated.
#[derive(Debug)]
pub struct ProgramBindings {
    program: Arc<dyn Program>,
    frame_index: u32,
    bindings: HashMap<ProgramArgument, Arc<ArgumentBinding>>,
    transitions: Mutex<TransitionBuckets>,
}

impl ProgramBindings {
    /// Builds bindings for every argument the program declares.
    ///
    /// Constant arguments reuse the program-wide shared binding;
    /// FrameConstant arguments reuse the per-frame shared binding; Mutable
    /// arguments get a private instance.  Fails with
    /// [`Error::UnboundArguments`](super::Error::UnboundArguments) naming
    /// every argument that ends up without a view, checked immediately after
    /// construction so no incomplete instance escapes.
    pub fn new(
        program: Arc<dyn Program>,
        views: &HashMap<ProgramArgument, Vec<ResourceView>>,
        frame_index: u32,
    ) -> Result<Arc<Self>, super::Error> {
        let mut bindings = HashMap::new();
        for accessor in program.argument_accessors() {
            let argument = accessor.argument().clone();
            let binding = match accessor.access() {
                AccessType::Constant | AccessType::FrameConstant => {
                    let cache_frame = (accessor.access() == AccessType::FrameConstant)
                        .then_some(frame_index);
                    program.binding_cache().get_or_create(&argument, cache_frame, || {
                        let binding = Arc::new(ArgumentBinding::new(accessor.clone()));
                        if let Some(argument_views) = views.get(&argument) {
                            binding.set_views(argument_views)?;
                        }
                        Ok(binding)
                    })?
                }
                AccessType::Mutable => {
                    let binding = Arc::new(ArgumentBinding::new(accessor.clone()));
                    if let Some(argument_views) = views.get(&argument) {
                        binding.set_views(argument_views)?;
                    }
                    binding
                }
            };
            bindings.insert(argument, binding);
        }

        let instance = Arc::new(Self {
            program,
            frame_index,
            bindings,
            transitions: Mutex::new(TransitionBuckets::default()),
        });
        instance.verify()?;
        instance.rebuild_transition_buckets();
        Ok(instance)
    }

    /// Builds a copy that reuses the source's shared bindings unchanged and
    /// re-instantiates only the Mutable ones.
    ///
    /// Mutable arguments present in `replace_views` take the replacement;
    /// absent ones inherit the source's views.  `replace_views` entries for
    /// shared arguments are rejected: shared state is never re-validated or
    /// re-assigned through a copy.
    pub fn create_copy(
        &self,
        replace_views: &HashMap<ProgramArgument, Vec<ResourceView>>,
        frame_index: u32,
    ) -> Result<Arc<Self>, super::Error> {
        for argument in replace_views.keys() {
            let accessor = self
                .program
                .find_argument_accessor(argument)
                .unwrap_or_else(|| panic!("program {} does not declare argument {argument}", self.program.name()));
            assert_eq!(
                accessor.access(),
                AccessType::Mutable,
                "cannot replace shared binding {argument} through a copy"
            );
        }

        let mut bindings = HashMap::new();
        for (argument, binding) in &self.bindings {
            let copied = match binding.accessor().access() {
                AccessType::Constant => binding.clone(),
                AccessType::FrameConstant => {
                    if frame_index == self.frame_index {
                        binding.clone()
                    } else {
                        //first bindings for this frame slot create the shared
                        //instance, inheriting the source's views
                        let source_views = binding.views();
                        let accessor = binding.accessor().clone();
                        self.program.binding_cache().get_or_create(
                            argument,
                            Some(frame_index),
                            || {
                                let fresh = Arc::new(ArgumentBinding::new(accessor));
                                fresh.set_views(&source_views)?;
                                Ok(fresh)
                            },
                        )?
                    }
                }
                AccessType::Mutable => {
                    let fresh = Arc::new(ArgumentBinding::new(binding.accessor().clone()));
                    let views = replace_views
                        .get(argument)
                        .cloned()
                        .unwrap_or_else(|| binding.views());
                    if !views.is_empty() {
                        fresh.set_views(&views)?;
                    }
                    fresh
                }
            };
            bindings.insert(argument.clone(), copied);
        }

        let instance = Arc::new(Self {
            program: self.program.clone(),
            frame_index,
            bindings,
            transitions: Mutex::new(TransitionBuckets::default()),
        });
        instance.verify()?;
        instance.rebuild_transition_buckets();
        Ok(instance)
    }

    /// Re-assigns views on Mutable arguments and recomputes the per-resource
    /// target states.
    pub fn set_resources_for_arguments(
        &self,
        views: &HashMap<ProgramArgument, Vec<ResourceView>>,
    ) -> Result<(), super::Error> {
        for (argument, argument_views) in views {
            let binding = self
                .bindings
                .get(argument)
                .unwrap_or_else(|| panic!("program {} does not declare argument {argument}", self.program.name()));
            if binding.accessor().access() == AccessType::Mutable {
                binding.clear_views();
            }
            binding.set_views(argument_views)?;
        }
        self.rebuild_transition_buckets();
        Ok(())
    }

    /// Checks completeness, naming every unbound argument.
    pub fn verify(&self) -> Result<(), super::Error> {
        let mut unbound = self
            .bindings
            .iter()
            .filter(|(_, binding)| !binding.is_bound())
            .map(|(argument, _)| argument.to_string())
            .collect::<Vec<_>>();
        if unbound.is_empty() {
            Ok(())
        } else {
            unbound.sort();
            Err(super::Error::UnboundArguments { arguments: unbound })
        }
    }

    /// Declared arguments that currently have no view.
    pub fn unbound_arguments(&self) -> Vec<ProgramArgument> {
        let mut unbound = self
            .bindings
            .iter()
            .filter(|(_, binding)| !binding.is_bound())
            .map(|(argument, _)| argument.clone())
            .collect::<Vec<_>>();
        unbound.sort_by(|a, b| a.name().cmp(b.name()));
        unbound
    }

    pub fn get(&self, argument: &ProgramArgument) -> Option<&Arc<ArgumentBinding>> {
        self.bindings.get(argument)
    }

    /// All argument bindings, in no particular order.
    pub fn bindings(&self) -> impl Iterator<Item = &Arc<ArgumentBinding>> {
        self.bindings.values()
    }

    pub fn program(&self) -> &Arc<dyn Program> {
        &self.program
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Every resource currently bound through any argument, strongly
    /// retained.  Used by command lists to extend lifetimes until execution
    /// completes.
    pub fn retained_resources(&self) -> Vec<Arc<dyn Resource>> {
        let mut resources = Vec::new();
        for binding in self.bindings.values() {
            for view in binding.views() {
                if let Some(resource) = view.resource() {
                    resources.push(resource);
                }
            }
        }
        resources
    }

    /// Requests a state (and optionally ownership) transition for every
    /// bucketed resource of the selected access types, accumulating barriers
    /// into `barriers`.  Returns whether any transition was necessary.
    ///
    /// A resource whose tracked state already matches the target contributes
    /// nothing.  A first-ever ownership assignment is an acquisition, not a
    /// transfer, and emits no barrier.
    pub fn apply_resource_states(
        &self,
        access: AccessTypeMask,
        owner_queue_family: Option<u32>,
        barriers: &ResourceBarrierSet,
    ) -> bool {
        let transitions = self.transitions.lock().expect("Failed to lock transition buckets");
        let mut any = false;
        let selected = [
            (AccessTypeMask::CONSTANT, &transitions.constant),
            (AccessTypeMask::FRAME_CONSTANT, &transitions.frame_constant),
            (AccessTypeMask::MUTABLE, &transitions.mutable),
        ];
        for (mask, bucket) in selected {
            if !access.contains(mask) {
                continue;
            }
            for (weak, target) in bucket {
                let Some(resource) = weak.upgrade() else {
                    //stale entry; the barrier set's release handling already
                    //covered any pending transition
                    continue;
                };
                let before = resource.state();
                if resource.set_state(*target) {
                    barriers.add(ResourceBarrier::state_transition(&resource, before, *target));
                    any = true;
                }
                if let Some(family) = owner_queue_family {
                    let previous_owner = resource.owner_queue_family();
                    if resource.set_owner_queue_family(family) {
                        if let Some(previous) = previous_owner {
                            barriers.add(ResourceBarrier::owner_transition(
                                &resource, previous, family,
                            ));
                            any = true;
                        }
                    }
                }
            }
        }
        if any {
            logwise::trace_sync!(
                "Applied resource states for program {program}",
                program = logwise::privacy::LogIt(self.program.name())
            );
        }
        any
    }

    fn rebuild_transition_buckets(&self) {
        let mut transitions = self.transitions.lock().expect("Failed to lock transition buckets");
        transitions.clear();
        for binding in self.bindings.values() {
            if binding.accessor().value() != ValueType::ResourceView {
                continue;
            }
            let access = binding.accessor().access();
            for view in binding.views() {
                let Some(resource) = view.resource() else {
                    continue;
                };
                let Some(target) = binding.target_state(&resource) else {
                    continue; //samplers have no state
                };
                transitions
                    .bucket_mut(access)
                    .push((Arc::downgrade(&resource), target));
            }
        }
    }
}
