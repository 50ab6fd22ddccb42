//! # Lineage
//!
//! **Lineage** attaches key/value data to a logical unit of asynchronous work
//! (one incoming request, one job) so that every task spawned transitively
//! from that unit can read it back without threading parameters through
//! every call. It is the building block for propagating things like the
//! active tracing span of a request.
//!
//! The crate has two halves:
//!
//! - A **context store** that mirrors the causal tree of asynchronous
//!   operations. Each operation gets a node; a node remembers the node that
//!   was current when it was created and falls back to it on lookups.
//! - A small **cooperative runtime** that reports the lifecycle of its tasks
//!   (init, before-poll, destroy) to any [`LifecycleHooks`] sink, the
//!   process-wide store included.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lineage::context;
//! use lineage::task;
//! use lineage::time::sleep;
//! use std::time::Duration;
//!
//! #[lineage::main(context)]
//! async fn main() {
//!     context::set("request-id", 42_u64, None).unwrap();
//!
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         *context::get::<u64>("request-id").unwrap()
//!     });
//!
//!     assert_eq!(handle.await, 42);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`context`]: The context store and its process-wide instance
//! - [`hooks`]: Execution ids and the lifecycle hook interface
//! - [`clock`]: Monotonic clocks used to timestamp nodes
//! - [`time`]: Timers
//! - [`task`]: Spawning and joining tasks

mod runtime;

pub mod clock;
pub mod context;
pub mod error;
pub mod hooks;
pub mod time;

pub use error::{Error, Result};
pub use hooks::{ExecutionId, LifecycleHooks, ResourceKind};
pub use runtime::builder::RuntimeBuilder;
pub use runtime::core::Runtime;
pub use runtime::execution_id;
pub use runtime::task;
pub use runtime::yield_now::yield_now;

pub use lineage_macros::*;
