use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicBool};
use std::task::Waker;
use std::time::Instant;

/// Pending wake-ups of one runtime.
///
/// Timers fire in deadline order; timers sharing a deadline fire in the
/// order they were armed.
#[derive(Default)]
pub(crate) struct TimerQueue {
    heap: BinaryHeap<Reverse<Timer>>,
    armed: u64,
}

struct Timer {
    deadline: Instant,
    seq: u64,
    waker: Waker,

    /// Raised by the sleep future when it is dropped before firing.
    abandoned: Arc<AtomicBool>,
}

impl Timer {
    fn key(&self) -> (Instant, u64) {
        (self.deadline, self.seq)
    }
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Result of [`TimerQueue::expire`].
pub(crate) struct Expired {
    /// Wakers of live timers that reached their deadline.
    pub(crate) wakers: Vec<Waker>,

    /// Deadline of the earliest timer still pending.
    pub(crate) next: Option<Instant>,
}

impl TimerQueue {
    pub(crate) fn insert(&mut self, deadline: Instant, waker: Waker, abandoned: Arc<AtomicBool>) {
        self.armed += 1;
        self.heap.push(Reverse(Timer {
            deadline,
            seq: self.armed,
            waker,
            abandoned,
        }));
    }

    /// Removes every timer due at `now`.
    ///
    /// Abandoned timers are dropped silently.
    pub(crate) fn expire(&mut self, now: Instant) -> Expired {
        let mut wakers = Vec::new();

        while let Some(Reverse(timer)) = self.heap.peek() {
            if timer.deadline > now {
                break;
            }
            if let Some(Reverse(timer)) = self.heap.pop() {
                if !timer.abandoned.load(atomic::Ordering::Acquire) {
                    wakers.push(timer.waker);
                }
            }
        }

        Expired {
            wakers,
            next: self.heap.peek().map(|Reverse(timer)| timer.deadline),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
    }
}
