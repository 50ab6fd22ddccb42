use super::context::enter_context;
use super::scheduler::Scheduler;
use super::task::JoinHandle;
use crate::hooks::{HookSet, ResourceKind};

use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// A cooperative runtime whose tasks are reported to lifecycle hooks.
///
/// Tasks and timers only make progress inside [`block_on`](Self::block_on),
/// on the calling thread. Dropping the runtime tears down unfinished tasks
/// and reports their destruction, so every node a context store created
/// for them is released.
pub struct Runtime {
    scheduler: Arc<Scheduler>,
}

impl Runtime {
    pub(crate) fn new(hooks: HookSet) -> Self {
        Self {
            scheduler: Arc::new(Scheduler::new(hooks)),
        }
    }

    /// Spawns a future onto the runtime.
    ///
    /// The task only makes progress while some thread is inside
    /// [`block_on`](Self::block_on).
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let handle = runtime.spawn(async { 1 });
    /// assert_eq!(runtime.block_on(handle), 1);
    /// ```
    pub fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.scheduler.spawn(future, ResourceKind::Task)
    }

    /// Runs a future to completion, blocking the current thread.
    ///
    /// The future becomes the root task of this call and every task it
    /// spawns is driven on this thread. Returns as soon as the root task
    /// completes; other tasks stay queued for the next call.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let runtime = RuntimeBuilder::new().build();
    /// let id = runtime.block_on(async { lineage::execution_id() });
    /// assert!(id.is_some());
    /// ```
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.scheduler.set_driver();
        let root = self.scheduler.spawn(future, ResourceKind::Root);

        enter_context(self.scheduler.clone(), || self.drive(&root))
    }

    fn drive<T>(&self, root: &JoinHandle<T>) -> T {
        loop {
            if let Some(output) = root.try_take() {
                return output;
            }

            if let Some(task) = self.scheduler.next_task() {
                task.run();
                continue;
            }

            let fired = self.scheduler.fire_timers(Instant::now());
            if fired.woken > 0 {
                continue;
            }

            match fired.next {
                Some(deadline) => {
                    thread::park_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => thread::park(),
            }
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.scheduler.shutdown();
    }
}
