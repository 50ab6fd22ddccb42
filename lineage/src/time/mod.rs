//! Timers.
//!
//! Timers are fired by the runtime driving the current thread. A task that
//! sleeps keeps its execution id, so its context is the same before and
//! after the sleep.

mod sleep;

#[doc(inline)]
pub use sleep::{Sleep, sleep, sleep_until};
