//! Asynchronous task primitives.
//!
//! Every task carries the [`ExecutionId`](crate::ExecutionId) under which
//! it is reported to lifecycle hooks, so a task is also the unit that owns
//! a context node.
//!
//! Most users will interact with this module through [`spawn`] and
//! [`JoinHandle`].

mod core;
mod handle;
mod state;

pub(crate) use self::core::{Runnable, Task};

pub use self::core::spawn;
pub use handle::JoinHandle;
