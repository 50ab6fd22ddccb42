use crate::runtime::context::current_scheduler;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Waits until `duration` has elapsed.
///
/// # Panics
///
/// The returned future panics if polled outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    sleep_until(Instant::now() + duration)
}

/// Waits until `deadline` is reached.
///
/// Completes on first poll if the deadline already passed.
pub fn sleep_until(deadline: Instant) -> Sleep {
    Sleep {
        deadline,
        armed: None,
    }
}

/// Future returned by [`sleep`] and [`sleep_until`].
///
/// The timer is armed on first poll. Dropping an armed `Sleep` disarms it.
pub struct Sleep {
    deadline: Instant,

    /// Flag shared with the runtime's timer once armed.
    armed: Option<Arc<AtomicBool>>,
}

impl Sleep {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        if this.is_elapsed() {
            return Poll::Ready(());
        }

        if this.armed.is_none() {
            let abandoned = Arc::new(AtomicBool::new(false));
            current_scheduler()
                .expect("Sleep polled outside of runtime")
                .register_timer(this.deadline, cx.waker().clone(), abandoned.clone());
            this.armed = Some(abandoned);
        }

        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(abandoned) = &self.armed {
            abandoned.store(true, Ordering::Release);
        }
    }
}
