// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! A backend with no native API behind it.
//!
//! Bindings and barriers get monotonically numbered handles; submissions get
//! monotonically numbered tickets that complete when the owner says so via
//! [`NopBackend::finish_through`].  Useful for tests and for running the
//! encode path headless.

use super::{Backend, BackendError, NativeBarrier, NativeBinding, Ticket};
use crate::bindings::ArgumentAccessor;
use crate::lists::CommandList;
use crate::sync::ResourceBarrier;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct NopBackend {
    next_binding: AtomicU64,
    next_barrier: AtomicU64,
    next_ticket: AtomicU64,
    finished_through: AtomicU64,
}

impl NopBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every ticket up to and including `ticket` as finished.
    pub fn finish_through(&self, ticket: Ticket) {
        self.finished_through.fetch_max(ticket.0, Ordering::AcqRel);
    }

    /// Marks every submission so far as finished.
    pub fn finish_all(&self) {
        self.finished_through
            .fetch_max(self.next_ticket.load(Ordering::Acquire), Ordering::AcqRel);
    }

    pub fn translated_barriers(&self) -> u64 {
        self.next_barrier.load(Ordering::Acquire)
    }
}

impl Backend for NopBackend {
    fn create_native_binding(&self, _accessor: &ArgumentAccessor) -> NativeBinding {
        NativeBinding(self.next_binding.fetch_add(1, Ordering::AcqRel) + 1)
    }

    fn translate_barrier(&self, _barrier: &ResourceBarrier) -> Result<NativeBarrier, BackendError> {
        Ok(NativeBarrier(self.next_barrier.fetch_add(1, Ordering::AcqRel) + 1))
    }

    fn submit(&self, _list: &CommandList) -> Ticket {
        Ticket(self.next_ticket.fetch_add(1, Ordering::AcqRel) + 1)
    }

    fn poll_completion(&self, ticket: Ticket) -> bool {
        ticket.0 <= self.finished_through.load(Ordering::Acquire)
    }
}
