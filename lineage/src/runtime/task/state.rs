/// Task is idle and not scheduled.
///
/// The task exists but is not currently queued or running.
pub(crate) const IDLE: usize = 0;

/// Task is waiting in the run queue.
pub(crate) const QUEUED: usize = 1;

/// Task is being polled.
pub(crate) const RUNNING: usize = 2;

/// The future returned `Poll::Ready` and will not be polled again.
pub(crate) const COMPLETED: usize = 3;

/// Task was woken while being polled and must be queued again afterwards.
pub(crate) const NOTIFIED: usize = 4;

/// Task was torn down before completing.
pub(crate) const CANCELLED: usize = 5;
