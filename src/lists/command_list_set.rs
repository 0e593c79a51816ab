// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Groups command lists sharing one queue for atomic execute/complete.

use super::command_list::{CommandList, CompletionHandler, ListState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// An ordered sequence of command lists submitted to one queue as a unit.
///
/// Submission order equals member order.  The set reports only
/// fully-submitted or fully-complete; individual members may finish at
/// different times (see [`complete`](Self::complete) and
/// [`complete_pending`](Self::complete_pending)), but observers of the set
/// never see a partial execute.
#[derive(Debug)]
pub struct CommandListSet {
    lists: Vec<Arc<CommandList>>,
    frame_index: Option<u32>,
    combined_name: String,
    executing: AtomicBool,
}

impl CommandListSet {
    /// # Panics
    ///
    /// Panics when `lists` is empty or its members do not all share one
    /// queue.
    pub fn new(lists: Vec<Arc<CommandList>>, frame_index: Option<u32>) -> Self {
        assert!(!lists.is_empty(), "command list set requires at least one list");
        let queue = lists[0].queue();
        for list in &lists[1..] {
            assert_eq!(
                list.queue(),
                queue,
                "command lists in a set must share one queue"
            );
        }
        let combined_name = lists
            .iter()
            .map(|list| list.name())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            lists,
            frame_index,
            combined_name,
            executing: AtomicBool::new(false),
        }
    }

    pub fn lists(&self) -> &[Arc<CommandList>] {
        &self.lists
    }

    pub fn frame_index(&self) -> Option<u32> {
        self.frame_index
    }

    /// Combined display name of the members, joined once at construction.
    /// A list's name is fixed when the list is created, so the join never
    /// goes stale and no rename tracking is needed.
    pub fn name(&self) -> &str {
        &self.combined_name
    }

    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::Acquire)
    }

    /// Submits every member in order, sharing one completion handler.
    ///
    /// # Panics
    ///
    /// Panics when the set is already executing, or when any member is not
    /// Committed.
    pub fn execute(&self, on_complete: Option<CompletionHandler>) {
        let was_executing = self.executing.swap(true, Ordering::AcqRel);
        assert!(
            !was_executing,
            "command list set {:?} is already executing",
            self.combined_name
        );
        for list in &self.lists {
            list.execute(on_complete.clone());
        }
        logwise::trace_sync!(
            "Executing command list set {name}",
            name = logwise::privacy::LogIt(&self.combined_name)
        );
    }

    /// Completes every member currently Executing.
    ///
    /// Members already back at Pending (completed individually) are skipped,
    /// which supports partial and parallel completion reporting from the
    /// backend.
    pub fn complete(&self) {
        for list in &self.lists {
            if list.state() == ListState::Executing {
                list.complete();
            }
        }
        self.executing.store(false, Ordering::Release);
    }

    /// Polls the backend for each executing member's ticket and completes
    /// the finished ones.  Returns true once every member is Pending, at
    /// which point the executing flag clears.
    pub fn complete_pending(&self) -> bool {
        for list in &self.lists {
            if list.state() != ListState::Executing {
                continue;
            }
            if let Some(ticket) = list.ticket() {
                if list.backend().poll_completion(ticket) {
                    list.complete();
                }
            }
        }
        let all_pending = self
            .lists
            .iter()
            .all(|list| list.state() == ListState::Pending);
        if all_pending {
            self.executing.store(false, Ordering::Release);
        }
        all_pending
    }
}
