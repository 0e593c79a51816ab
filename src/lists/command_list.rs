// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The command-list state machine.

use super::debug_group::DebugGroup;
use crate::backend::{Backend, BackendError, NativeBarrier, Ticket};
use crate::bindings::ProgramBindings;
use crate::resources::Resource;
use crate::sync::{ResourceBarrier, ResourceBarrierSet};
use smallvec::SmallVec;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Lifecycle state of a command list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// Idle; the previous execution (if any) has fully completed.
    Pending,
    /// Open for encoding.
    Encoding,
    /// Encoding closed; ready to submit.
    Committed,
    /// Submitted; the GPU owns the work.
    Executing,
}

/// Identity of the submission queue a list encodes for.
///
/// Opaque to the core beyond equality, except that `family` feeds
/// queue-ownership transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId {
    pub family: u32,
    pub index: u32,
}

bitflags::bitflags! {
    /// Controls what [`CommandList::set_program_bindings`] does beyond
    /// activating the bindings.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ApplyBehavior: u8 {
        /// Skip re-applying Constant resources when the previously applied
        /// bindings belong to the same program.
        const CONSTANT_ONCE    = 1 << 0;
        /// No-op when the identical bindings object is already active.
        const CHANGES_ONLY     = 1 << 1;
        /// Compute and insert state-transition barriers now.
        const STATE_BARRIERS   = 1 << 2;
        /// Keep bound resources alive until execution completes.
        const RETAIN_RESOURCES = 1 << 3;
    }
}

/// Callback invoked when a list's execution completes.  Shared across the
/// members of a [`CommandListSet`](super::CommandListSet), hence `Arc<Fn>`
/// rather than a one-shot closure.
pub type CompletionHandler = Arc<dyn Fn(&CommandList) + Send + Sync>;

struct EncodeInner {
    debug_groups: SmallVec<[DebugGroup; 4]>,
    retained: Vec<Arc<dyn Resource>>,
    applied: Option<Arc<ProgramBindings>>,
    barriers: ResourceBarrierSet,
    native_barriers: Vec<NativeBarrier>,
    on_complete: Option<CompletionHandler>,
    completed_waiters: Vec<r#continue::Sender<()>>,
    ticket: Option<Ticket>,
}

/// One sequence of GPU operations, recycled frame to frame.
///
/// # Threading
///
/// One worker thread owns and encodes into one list.  Transitions are guarded
/// by an internal mutex separate from the state-change condvar pair, so a
/// thread blocked in [`wait_until_completed`](Self::wait_until_completed)
/// never contends with the encode/commit/execute paths.  The only blocking
/// operation is that wait; every encoding call is synchronous and
/// non-blocking.
pub struct CommandList {
    name: String,
    queue: QueueId,
    backend: Arc<dyn Backend>,
    //state + condvar are the wait pair; inner guards encode data.
    //lock order where both are held: state, then inner.
    state: Mutex<ListState>,
    state_changed: Condvar,
    inner: Mutex<EncodeInner>,
}

impl std::fmt::Debug for CommandList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandList")
            .field("name", &self.name)
            .field("queue", &self.queue)
            .field("state", &self.state())
            .finish()
    }
}

impl CommandList {
    pub fn new(name: impl Into<String>, queue: QueueId, backend: Arc<dyn Backend>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            queue,
            backend,
            state: Mutex::new(ListState::Pending),
            state_changed: Condvar::new(),
            inner: Mutex::new(EncodeInner {
                debug_groups: SmallVec::new(),
                retained: Vec::new(),
                applied: None,
                barriers: ResourceBarrierSet::new(),
                native_barriers: Vec::new(),
                on_complete: None,
                completed_waiters: Vec::new(),
                ticket: None,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn queue(&self) -> QueueId {
        self.queue
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn state(&self) -> ListState {
        *self.state.lock().expect("Failed to lock list state")
    }

    fn illegal_state(&self, op: &str, current: ListState, required: &str) -> ! {
        panic!(
            "{op}: illegal command list state {current:?} for {name:?}, requires {required}",
            name = self.name
        )
    }

    /// Opens the list for a new encode.
    ///
    /// Clears the active bindings, releases resources retained by the
    /// previous encode, closes any debug-group nesting the previous encode
    /// left open, discards accumulated barriers, and opens `debug_group` if
    /// given.  Resetting an Encoding list discards the uncommitted encoding;
    /// that is the only cancellation point in the lifecycle.
    ///
    /// # Panics
    ///
    /// Panics when the list is Committed or Executing.
    pub fn reset(&self, debug_group: Option<DebugGroup>) {
        let mut state = self.state.lock().expect("Failed to lock list state");
        match *state {
            ListState::Committed | ListState::Executing => {
                let current = *state;
                drop(state);
                self.illegal_state("reset", current, "Pending or Encoding");
            }
            ListState::Pending | ListState::Encoding => {}
        }
        let mut inner = self.inner.lock().expect("Failed to lock command list");
        inner.applied = None;
        inner.retained.clear();
        while let Some(group) = inner.debug_groups.pop() {
            logwise::trace_sync!(
                "Closing dangling debug group {group}",
                group = logwise::privacy::LogIt(group.name())
            );
        }
        inner.barriers.clear();
        inner.native_barriers.clear();
        inner.ticket = None;
        if let Some(group) = debug_group {
            inner.debug_groups.push(group);
        }
        *state = ListState::Encoding;
        self.state_changed.notify_all();
    }

    /// Like [`reset`](Self::reset), but a no-op when the list is already
    /// Encoding; the first reset of the frame owns the root debug group.
    pub fn reset_once(&self, debug_group: Option<DebugGroup>) {
        {
            let state = self.state.lock().expect("Failed to lock list state");
            if *state == ListState::Encoding {
                return;
            }
        }
        self.reset(debug_group);
    }

    /// Activates program bindings on the list.
    ///
    /// No-op when `CHANGES_ONLY` is set and the identical bindings object
    /// (by `Arc` pointer) is already active; a
    /// [`create_copy`](ProgramBindings::create_copy) result is a distinct
    /// object and is always re-applied.  With `STATE_BARRIERS`, required
    /// transitions are computed now and inserted into the list's barrier
    /// set; with `RETAIN_RESOURCES`, every bound resource is kept alive
    /// until the list returns to Pending.
    ///
    /// # Panics
    ///
    /// Panics when the list is not Encoding.
    pub fn set_program_bindings(&self, bindings: &Arc<ProgramBindings>, behavior: ApplyBehavior) {
        let state = self.state.lock().expect("Failed to lock list state");
        if *state != ListState::Encoding {
            let current = *state;
            drop(state);
            self.illegal_state("set_program_bindings", current, "Encoding");
        }
        let mut inner = self.inner.lock().expect("Failed to lock command list");
        drop(state);

        if behavior.contains(ApplyBehavior::CHANGES_ONLY) {
            if let Some(applied) = &inner.applied {
                if Arc::ptr_eq(applied, bindings) {
                    return;
                }
            }
        }

        let mut access = crate::bindings::AccessTypeMask::all();
        if behavior.contains(ApplyBehavior::CONSTANT_ONCE) {
            if let Some(applied) = &inner.applied {
                if Arc::ptr_eq(applied.program(), bindings.program()) {
                    //constants were applied for this program already
                    access.remove(crate::bindings::AccessTypeMask::CONSTANT);
                }
            }
        }

        for binding in bindings.bindings() {
            binding.native_binding(&self.backend);
        }

        if behavior.contains(ApplyBehavior::STATE_BARRIERS) {
            bindings.apply_resource_states(access, Some(self.queue.family), &inner.barriers);
        }
        if behavior.contains(ApplyBehavior::RETAIN_RESOURCES) {
            let mut resources = bindings.retained_resources();
            inner.retained.append(&mut resources);
        }
        inner.applied = Some(bindings.clone());
    }

    /// Opens a nested debug group.
    ///
    /// # Panics
    ///
    /// Panics when the list is not Encoding.
    pub fn push_debug_group(&self, group: DebugGroup) {
        let state = self.state();
        if state != ListState::Encoding {
            self.illegal_state("push_debug_group", state, "Encoding");
        }
        self.inner
            .lock()
            .expect("Failed to lock command list")
            .debug_groups
            .push(group);
    }

    /// Closes the innermost open debug group.
    ///
    /// # Panics
    ///
    /// Panics when the list is not Encoding, or when no group is open.
    pub fn pop_debug_group(&self) -> DebugGroup {
        let state = self.state();
        if state != ListState::Encoding {
            self.illegal_state("pop_debug_group", state, "Encoding");
        }
        self.inner
            .lock()
            .expect("Failed to lock command list")
            .debug_groups
            .pop()
            .unwrap_or_else(|| panic!("pop_debug_group: no debug group open on {:?}", self.name))
    }

    /// Depth of the open debug-group stack.
    pub fn debug_group_depth(&self) -> usize {
        self.inner
            .lock()
            .expect("Failed to lock command list")
            .debug_groups
            .len()
    }

    /// Closes the encoding: remaining open debug groups are popped, the
    /// accumulated barriers are translated through the backend, and the list
    /// becomes Committed.
    ///
    /// Translation failure propagates and leaves the list Encoding; there is
    /// no retry in this core.
    ///
    /// # Panics
    ///
    /// Panics when the list is not Encoding.
    pub fn commit(&self) -> Result<(), BackendError> {
        let mut state = self.state.lock().expect("Failed to lock list state");
        if *state != ListState::Encoding {
            let current = *state;
            drop(state);
            self.illegal_state("commit", current, "Encoding");
        }
        let mut inner = self.inner.lock().expect("Failed to lock command list");
        while let Some(group) = inner.debug_groups.pop() {
            logwise::trace_sync!(
                "Closing debug group {group} at commit",
                group = logwise::privacy::LogIt(group.name())
            );
        }
        let pending = inner.barriers.barriers();
        let mut native = Vec::with_capacity(pending.len());
        for barrier in &pending {
            if barrier.resource().is_none() {
                continue; //released since insertion; nothing to transition
            }
            native.push(self.backend.translate_barrier(barrier)?);
        }
        inner.native_barriers = native;
        *state = ListState::Committed;
        self.state_changed.notify_all();
        Ok(())
    }

    /// Submits the list to its queue through the backend, storing the
    /// completion handler for [`complete`](Self::complete).
    ///
    /// The backend receives `&CommandList` and may read it
    /// ([`native_barriers`](Self::native_barriers), [`state`](Self::state),
    /// and the rest); no internal lock is held across the submit call.  The
    /// list is Executing by the time the backend sees it.
    ///
    /// # Panics
    ///
    /// Panics when the list is not Committed.
    pub fn execute(&self, on_complete: Option<CompletionHandler>) {
        {
            let mut state = self.state.lock().expect("Failed to lock list state");
            if *state != ListState::Committed {
                let current = *state;
                drop(state);
                self.illegal_state("execute", current, "Committed");
            }
            let mut inner = self.inner.lock().expect("Failed to lock command list");
            inner.on_complete = on_complete;
            //flip before submitting so a racing execute panics instead of
            //double-submitting
            *state = ListState::Executing;
            self.state_changed.notify_all();
        }
        let ticket = self.backend.submit(self);
        let state = self.state.lock().expect("Failed to lock list state");
        //the ticket belongs to this execution only; if the backend reported
        //completion synchronously the list is Pending again and the ticket
        //is already spent
        if *state == ListState::Executing {
            self.inner
                .lock()
                .expect("Failed to lock command list")
                .ticket = Some(ticket);
        }
        drop(state);
        logwise::trace_sync!(
            "Executing command list {name}",
            name = logwise::privacy::LogIt(&self.name)
        );
    }

    /// Marks GPU execution finished.  Called by the owning queue or
    /// [`CommandListSet`](super::CommandListSet) once the backend reports the
    /// submission ticket complete.
    ///
    /// Releases retained resources, transitions to Pending (waking
    /// [`wait_until_completed`](Self::wait_until_completed) waiters), then
    /// invokes the completion handler and fires execution-completed
    /// notifications.  The handler observes the list already Pending.
    ///
    /// # Panics
    ///
    /// Panics when the list is not Executing.
    pub fn complete(&self) {
        let (retained, handler, waiters);
        {
            let mut state = self.state.lock().expect("Failed to lock list state");
            if *state != ListState::Executing {
                let current = *state;
                drop(state);
                self.illegal_state("complete", current, "Executing");
            }
            let mut inner = self.inner.lock().expect("Failed to lock command list");
            retained = std::mem::take(&mut inner.retained);
            handler = inner.on_complete.take();
            waiters = std::mem::take(&mut inner.completed_waiters);
            inner.ticket = None;
            *state = ListState::Pending;
            self.state_changed.notify_all();
        }
        drop(retained);
        for sender in waiters {
            sender.send(());
        }
        if let Some(handler) = handler {
            handler(self);
        }
        logwise::trace_sync!(
            "Completed command list {name}",
            name = logwise::privacy::LogIt(&self.name)
        );
    }

    /// Blocks until the list is no longer Executing, or the timeout elapses.
    /// `None` and a zero duration both wait forever.  Returns false on
    /// timeout.
    ///
    /// A list that is not Executing returns immediately.
    pub fn wait_until_completed(&self, timeout: Option<Duration>) -> bool {
        let state = self.state.lock().expect("Failed to lock list state");
        match timeout.filter(|timeout| !timeout.is_zero()) {
            None => {
                let mut state = state;
                while *state == ListState::Executing {
                    state = self
                        .state_changed
                        .wait(state)
                        .expect("Failed to wait on list state");
                }
                true
            }
            Some(timeout) => {
                let (_state, result) = self
                    .state_changed
                    .wait_timeout_while(state, timeout, |s| *s == ListState::Executing)
                    .expect("Failed to wait on list state");
                !result.timed_out()
            }
        }
    }

    /// A future resolving when execution completes.  Resolves immediately
    /// when the list is not Executing.
    pub fn completed(&self) -> impl Future<Output = ()> + Send + 'static {
        let (sender, receiver) = r#continue::continuation();
        {
            let state = self.state.lock().expect("Failed to lock list state");
            if *state == ListState::Executing {
                self.inner
                    .lock()
                    .expect("Failed to lock command list")
                    .completed_waiters
                    .push(sender);
            } else {
                sender.send(());
            }
        }
        async move { receiver.await }
    }

    /// Snapshot of the barriers accumulated for this encode.
    pub fn pending_barriers(&self) -> Vec<ResourceBarrier> {
        self.inner
            .lock()
            .expect("Failed to lock command list")
            .barriers
            .barriers()
    }

    /// The list's barrier set, shared with
    /// [`ProgramBindings::apply_resource_states`](crate::bindings::ProgramBindings::apply_resource_states).
    pub fn barrier_set(&self) -> ResourceBarrierSet {
        self.inner
            .lock()
            .expect("Failed to lock command list")
            .barriers
            .clone()
    }

    /// Backend records produced at commit.
    pub fn native_barriers(&self) -> Vec<NativeBarrier> {
        self.inner
            .lock()
            .expect("Failed to lock command list")
            .native_barriers
            .clone()
    }

    /// The submission ticket, present while Executing.
    pub fn ticket(&self) -> Option<Ticket> {
        self.inner.lock().expect("Failed to lock command list").ticket
    }

    /// Number of resources retained until completion.
    pub fn retained_resource_count(&self) -> usize {
        self.inner
            .lock()
            .expect("Failed to lock command list")
            .retained
            .len()
    }
}
