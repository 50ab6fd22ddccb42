//! Lifecycle hooks for asynchronous operations.
//!
//! A scheduler reports three moments in the life of every asynchronous
//! operation it owns:
//!
//! - **init**: the operation exists and knows which operation spawned it,
//! - **before**: its code is about to run on the current thread,
//! - **destroy**: it finished or was discarded.
//!
//! The runtime in this crate emits these events for each task. Other
//! schedulers can drive any [`LifecycleHooks`] implementation by hand.

use serde::Serialize;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of process-unique execution ids. Zero is never handed out.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of one asynchronous operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ExecutionId(u64);

impl ExecutionId {
    /// Allocates a fresh id, unique for the lifetime of the process.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps an id assigned by an external scheduler.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of operation an execution id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// The future driven by [`Runtime::block_on`](crate::Runtime::block_on).
    Root,

    /// A task created with [`task::spawn`](crate::task::spawn) or
    /// [`Runtime::spawn`](crate::Runtime::spawn).
    Task,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Root => "root",
            ResourceKind::Task => "task",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callbacks fired by a scheduler over the life of each operation.
///
/// # Ordering
///
/// `on_before(id)` must be called synchronously right before the code of
/// `id` runs, and no other `on_before` may fire on the same thread until
/// that code yields. Implementations rely on this to know which operation
/// is current.
///
/// `on_destroy` may be called more than once for the same id, or for ids
/// that were never initialized; implementations must tolerate both.
pub trait LifecycleHooks: Send + Sync {
    /// A new operation `id` was created while `trigger` was running.
    fn on_init(&self, id: ExecutionId, kind: ResourceKind, trigger: Option<ExecutionId>);

    /// The code of `id` is about to run on the current thread.
    fn on_before(&self, id: ExecutionId);

    /// The operation `id` is gone.
    fn on_destroy(&self, id: ExecutionId);
}

/// Fan-out of lifecycle events to every attached sink.
#[derive(Clone, Default)]
pub(crate) struct HookSet {
    sinks: Vec<Arc<dyn LifecycleHooks>>,
}

impl HookSet {
    pub(crate) fn new(sinks: Vec<Arc<dyn LifecycleHooks>>) -> Self {
        Self { sinks }
    }

    pub(crate) fn init(&self, id: ExecutionId, kind: ResourceKind, trigger: Option<ExecutionId>) {
        for sink in &self.sinks {
            sink.on_init(id, kind, trigger);
        }
    }

    pub(crate) fn before(&self, id: ExecutionId) {
        for sink in &self.sinks {
            sink.on_before(id);
        }
    }

    pub(crate) fn destroy(&self, id: ExecutionId) {
        for sink in &self.sinks {
            sink.on_destroy(id);
        }
    }
}
