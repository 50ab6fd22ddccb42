use super::JoinHandle;
use super::state::{CANCELLED, COMPLETED, IDLE, NOTIFIED, QUEUED, RUNNING};
use crate::hooks::{ExecutionId, ResourceKind};
use crate::runtime::context::{self, enter_task};
use crate::runtime::scheduler::Scheduler;

use parking_lot::Mutex;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll, Wake, Waker};

/// Type-erased view of a task, as stored in the run queue.
pub(crate) trait Runnable: Send + Sync {
    fn run(self: Arc<Self>);

    /// Drops the future of an unfinished task and reports its destruction.
    fn shutdown(&self);
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// One spawned future and the execution id it is reported under.
pub(crate) struct Task<T> {
    pub(crate) id: ExecutionId,

    /// `None` once the future completed or was torn down.
    future: Mutex<Option<BoxFuture<T>>>,

    /// Output, kept until the [`JoinHandle`] takes it.
    pub(crate) result: Mutex<Option<T>>,

    /// See [`super::state`].
    pub(crate) state: AtomicUsize,

    scheduler: Arc<Scheduler>,

    pub(crate) waiters: Mutex<Vec<Waker>>,
}

impl<T: Send + 'static> Task<T> {
    pub(crate) fn new<F>(id: ExecutionId, future: F, scheduler: Arc<Scheduler>) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            id,
            future: Mutex::new(Some(Box::pin(future))),
            result: Mutex::new(None),
            state: AtomicUsize::new(QUEUED),
            scheduler,
            waiters: Mutex::new(Vec::new()),
        }
    }

    fn transition(&self, from: usize, to: usize) -> bool {
        self.state
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claims the task, announces the poll to the hooks and polls it with
    /// its id marked as the running execution.
    fn poll_once(self: Arc<Self>) {
        if !self.transition(QUEUED, RUNNING) && !self.transition(NOTIFIED, RUNNING) {
            return;
        }

        self.scheduler.hooks().before(self.id);

        let waker = Waker::from(self.clone());
        match enter_task(self.id, || self.poll_future(&waker)) {
            Some(output) => self.complete(output),
            None => self.suspend(),
        }
    }

    fn poll_future(&self, waker: &Waker) -> Option<T> {
        let mut slot = self.future.lock();
        let future = slot.as_mut()?;

        match future.as_mut().poll(&mut Context::from_waker(waker)) {
            Poll::Ready(output) => {
                *slot = None;
                Some(output)
            }
            Poll::Pending => None,
        }
    }

    /// Back to `IDLE`, unless a wake-up arrived during the poll.
    fn suspend(self: Arc<Self>) {
        if !self.transition(RUNNING, IDLE) {
            self.state.store(QUEUED, Ordering::Release);
            self.scheduler.push(self.clone());
        }
    }

    fn complete(&self, output: T) {
        *self.result.lock() = Some(output);
        self.state.store(COMPLETED, Ordering::Release);

        self.scheduler.retire(self.id);
        self.wake_waiters();
    }

    /// Queues an `IDLE` task; a `RUNNING` one is flagged `NOTIFIED` and
    /// re-queued by [`suspend`](Self::suspend).
    fn schedule(self: Arc<Self>) {
        loop {
            match self.state.load(Ordering::Acquire) {
                IDLE if self.transition(IDLE, QUEUED) => {
                    return self.scheduler.push(self.clone());
                }
                RUNNING if self.transition(RUNNING, NOTIFIED) => return,
                IDLE | RUNNING => continue,
                _ => return,
            }
        }
    }

    fn wake_waiters(&self) {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        waiters.into_iter().for_each(Waker::wake);
    }
}

impl<T: Send + 'static> Runnable for Task<T> {
    fn run(self: Arc<Self>) {
        self.poll_once()
    }

    fn shutdown(&self) {
        let mut state = self.state.load(Ordering::Acquire);

        while state != COMPLETED && state != CANCELLED {
            match self.state.compare_exchange(
                state,
                CANCELLED,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    drop(self.future.lock().take());
                    self.scheduler.hooks().destroy(self.id);
                    self.wake_waiters();
                    return;
                }
                Err(actual) => state = actual,
            }
        }
    }
}

impl<T: Send + 'static> Wake for Task<T> {
    fn wake(self: Arc<Self>) {
        self.schedule();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.clone().schedule();
    }
}

/// Spawns a future as a task onto the current runtime.
///
/// The task that calls `spawn` is reported as the trigger of the new one,
/// so context set by the caller is visible to it.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime.
pub fn spawn<F, T>(future: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    context::current_scheduler()
        .expect("spawn must be called within the context of a runtime")
        .spawn(future, ResourceKind::Task)
}
