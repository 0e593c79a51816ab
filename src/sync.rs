// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource state and ownership synchronization.
//!
//! The native APIs we target disagree on synchronization: one wants explicit
//! pipeline barriers with access/layout pairs, one wants queue-family
//! ownership transfers on top of that, and one tracks hazards implicitly and
//! ignores most of this.  The portable contract is a
//! [`ResourceBarrierSet`]: a keyed, mergeable collection of pending
//! transitions that a command list accumulates while encoding and hands to
//! the backend at commit.
//!
//! Keying is by (resource identity, barrier kind), so a set holds at most
//! one state transition and one ownership transition per resource.  Adding a
//! transition that is already pending merges into the existing record rather
//! than queueing a second one.

mod barrier;
mod barrier_set;
mod pipeline_stages;

pub use barrier::{AddResult, BarrierChange, BarrierId, BarrierKind, ResourceBarrier};
pub use barrier_set::ResourceBarrierSet;
pub use pipeline_stages::PipelineStages;
