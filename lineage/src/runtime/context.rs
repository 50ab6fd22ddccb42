use super::scheduler::Scheduler;
use crate::hooks::ExecutionId;

use std::cell::{Cell, RefCell};
use std::sync::Arc;

thread_local! {
    /// Scheduler of the runtime driving this thread.
    ///
    /// Set while inside [`Runtime::block_on`](super::core::Runtime::block_on)
    /// so that `spawn` and timers can reach it without explicit handles.
    static CURRENT_SCHEDULER: RefCell<Option<Arc<Scheduler>>> =
        const { RefCell::new(None) };

    /// Id of the task currently being polled on this thread.
    static CURRENT_TASK: Cell<Option<ExecutionId>> = const { Cell::new(None) };
}

/// Runs `f` with `scheduler` installed as the thread's runtime.
///
/// The previous scheduler is restored afterwards.
pub(crate) fn enter_context<R>(scheduler: Arc<Scheduler>, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_SCHEDULER.with(|cell| cell.replace(Some(scheduler)));
    let out = f();
    CURRENT_SCHEDULER.with(|cell| cell.replace(previous));
    out
}

/// Runs `f` with `id` marked as the task being polled.
pub(crate) fn enter_task<R>(id: ExecutionId, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_TASK.with(|cell| cell.replace(Some(id)));
    let out = f();
    CURRENT_TASK.with(|cell| cell.set(previous));
    out
}

pub(crate) fn current_task() -> Option<ExecutionId> {
    CURRENT_TASK.with(Cell::get)
}

/// Returns the scheduler of the runtime driving this thread.
pub(crate) fn current_scheduler() -> Option<Arc<Scheduler>> {
    CURRENT_SCHEDULER.with(|cell| cell.borrow().clone())
}
