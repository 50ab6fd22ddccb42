//! Cooperative single-threaded runtime.
//!
//! The runtime drives tasks one at a time on the thread that calls
//! [`Runtime::block_on`](self::core::Runtime::block_on). Every task is an
//! asynchronous operation in the sense of [`crate::hooks`]:
//!
//! - spawning a task emits `on_init`, with the task being polled at that
//!   moment as trigger,
//! - every poll is preceded by `on_before`,
//! - completion, or shutdown of an unfinished task, emits `on_destroy`.
//!
//! It is responsible for:
//! - running the root future and every task spawned from it,
//! - firing timers registered by [`crate::time::sleep`],
//! - parking the thread while nothing is runnable.

mod scheduler;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod core;
pub(crate) mod timer;
pub(crate) mod yield_now;

pub mod task;

use crate::hooks::ExecutionId;

/// Id of the task being polled on this thread, as known to the runtime.
///
/// `None` outside of a task poll. This is the scheduler's own view and
/// does not depend on any context store being enabled.
pub fn execution_id() -> Option<ExecutionId> {
    context::current_task()
}
