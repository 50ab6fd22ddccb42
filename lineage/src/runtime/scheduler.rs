use super::context;
use super::task::{JoinHandle, Runnable, Task};
use super::timer::TimerQueue;
use crate::hooks::{ExecutionId, HookSet, ResourceKind};

use parking_lot::Mutex;

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::task::Waker;
use std::thread::{self, Thread};
use std::time::Instant;

/// Shared state of one runtime.
///
/// Holds the run queue, pending timers and every task that has not
/// finished yet, and reports task lifecycles to the attached hooks.
pub(crate) struct Scheduler {
    /// Tasks ready to be polled, in FIFO order.
    ready: Mutex<VecDeque<Arc<dyn Runnable>>>,

    timers: Mutex<TimerQueue>,

    /// Unfinished tasks, so that shutdown can release them.
    live: Mutex<HashMap<ExecutionId, Arc<dyn Runnable>>>,

    hooks: HookSet,

    /// Thread driving `block_on`, unparked whenever work arrives.
    driver: Mutex<Option<Thread>>,
}

/// Outcome of [`Scheduler::fire_timers`].
pub(crate) struct Fired {
    /// Number of timers whose waker was called.
    pub(crate) woken: usize,

    /// Deadline of the earliest remaining timer.
    pub(crate) next: Option<Instant>,
}

impl Scheduler {
    pub(crate) fn new(hooks: HookSet) -> Self {
        Self {
            ready: Mutex::new(VecDeque::new()),
            timers: Mutex::new(TimerQueue::default()),
            live: Mutex::new(HashMap::new()),
            hooks,
            driver: Mutex::new(None),
        }
    }

    pub(crate) fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// Creates a task for `future` and queues it.
    ///
    /// `on_init` is emitted before the task can run, with the task being
    /// polled on this thread (if any) as trigger.
    pub(crate) fn spawn<F, T>(self: &Arc<Self>, future: F, kind: ResourceKind) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let id = ExecutionId::next();
        let task = Arc::new(Task::new(id, future, self.clone()));

        self.live.lock().insert(id, task.clone());
        self.hooks.init(id, kind, context::current_task());
        self.push(task.clone());

        JoinHandle { task }
    }

    /// Queues a task and wakes the driving thread.
    pub(crate) fn push(&self, task: Arc<dyn Runnable>) {
        self.ready.lock().push_back(task);

        if let Some(driver) = self.driver.lock().as_ref() {
            driver.unpark();
        }
    }

    pub(crate) fn next_task(&self) -> Option<Arc<dyn Runnable>> {
        self.ready.lock().pop_front()
    }

    /// Marks the calling thread as the one driving this scheduler.
    pub(crate) fn set_driver(&self) {
        *self.driver.lock() = Some(thread::current());
    }

    /// Arms a timer that wakes `waker` at `deadline` unless `abandoned`
    /// is raised first.
    pub(crate) fn register_timer(
        &self,
        deadline: Instant,
        waker: Waker,
        abandoned: Arc<AtomicBool>,
    ) {
        self.timers.lock().insert(deadline, waker, abandoned);
    }

    /// Wakes every timer due at `now`.
    ///
    /// Wakers run after the timer lock is released.
    pub(crate) fn fire_timers(&self, now: Instant) -> Fired {
        let expired = self.timers.lock().expire(now);

        let woken = expired.wakers.len();
        expired.wakers.into_iter().for_each(Waker::wake);

        Fired {
            woken,
            next: expired.next,
        }
    }

    /// Forgets a finished task and reports its destruction.
    pub(crate) fn retire(&self, id: ExecutionId) {
        self.live.lock().remove(&id);
        self.hooks.destroy(id);
    }

    /// Drops all queued work and tears down every unfinished task.
    pub(crate) fn shutdown(&self) {
        self.ready.lock().clear();
        self.timers.lock().clear();

        let live: Vec<_> = self.live.lock().drain().map(|(_, task)| task).collect();
        for task in live {
            task.shutdown();
        }

        self.driver.lock().take();
    }
}
