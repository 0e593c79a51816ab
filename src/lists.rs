// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Command-list lifecycle.

A [`CommandList`] is an explicit state machine:

```text
Pending -(reset)-> Encoding -(commit)-> Committed -(execute)-> Executing -(complete)-> Pending
```

Lists are recycled frame to frame via reset, never destroyed per frame.  Any
out-of-order transition is a programming error and panics with the current
and required state; silently ignoring one would corrupt the GPU command
stream.

A [`CommandListSet`] groups lists that share one submission queue so they can
be executed and completed as a unit.
*/

mod command_list;
mod command_list_set;
mod debug_group;

pub use command_list::{ApplyBehavior, CommandList, CompletionHandler, ListState, QueueId};
pub use command_list_set::CommandListSet;
pub use debug_group::DebugGroup;
