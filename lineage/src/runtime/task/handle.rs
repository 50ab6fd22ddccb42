use super::Task;
use super::state::{CANCELLED, COMPLETED};
use crate::hooks::ExecutionId;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::task::{Context, Poll};

/// A handle to a spawned task.
///
/// Resolves to the task's output once it completes. Dropping the handle
/// does **not** cancel the task; it only discards the ability to observe
/// its result.
pub struct JoinHandle<T> {
    pub(crate) task: Arc<Task<T>>,
}

impl<T> JoinHandle<T> {
    /// Execution id of the task, as reported to lifecycle hooks.
    pub fn id(&self) -> ExecutionId {
        self.task.id
    }

    /// Returns `true` once the task completed or was torn down.
    pub fn is_finished(&self) -> bool {
        matches!(self.task.state.load(Ordering::Acquire), COMPLETED | CANCELLED)
    }

    /// Takes the output if the task has completed.
    pub(crate) fn try_take(&self) -> Option<T> {
        if self.task.state.load(Ordering::Acquire) != COMPLETED {
            return None;
        }
        self.task.result.lock().take()
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = T;

    /// The waker is registered **before** re-checking the task state to
    /// avoid missed wake-ups.
    ///
    /// A task torn down by runtime shutdown never resolves.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if let Some(value) = self.try_take() {
            return Poll::Ready(value);
        }

        self.task.waiters.lock().push(cx.waker().clone());

        match self.try_take() {
            Some(value) => Poll::Ready(value),
            None => Poll::Pending,
        }
    }
}
