use super::config::StoreConfig;
use super::node::ContextNode;
use super::registry::Registry;
use super::snapshot::Snapshot;
use super::tracker::Tracker;
use crate::clock::{Clock, MonotonicClock};
use crate::error::{Error, Result};
use crate::hooks::{ExecutionId, LifecycleHooks, ResourceKind};
use crate::runtime;

use tracing::{debug, trace};

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Keys rendered beside user data in diagnostics; callers may not set them.
pub const RESERVED_KEYS: [&str; 2] = ["created", "parent"];

/// Best-effort "current execution" reported by the scheduler itself.
pub type FallbackFn = fn() -> Option<ExecutionId>;

/// Storage scoped to the causal tree of asynchronous operations.
///
/// The store receives lifecycle events through its [`LifecycleHooks`]
/// implementation. `on_init` creates a node linked to the node that was
/// current at that moment, `on_before` marks an execution as current on the
/// calling thread, and `on_destroy` drops its node. Lookups start at the
/// current node and fall back along parent links.
///
/// A store starts disabled: it ignores every event until
/// [`enable`](Self::enable) is called.
pub struct ContextStore {
    registry: Registry,
    tracker: Tracker,
    clock: Arc<dyn Clock>,
    fallback: FallbackFn,
    enabled: AtomicBool,
    linked_top: AtomicBool,
}

impl ContextStore {
    /// Creates a disabled store with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ContextStoreBuilder {
        ContextStoreBuilder::new()
    }

    /// Starts accepting lifecycle events. Idempotent.
    pub fn enable(&self) {
        if !self.enabled.swap(true, Ordering::AcqRel) {
            debug!("context store enabled");
        }
    }

    /// Stops accepting lifecycle events. Idempotent.
    ///
    /// Existing nodes are kept, but while disabled no node is created or
    /// destroyed and [`current_id`](Self::current_id) reports the
    /// scheduler's own notion of the current execution.
    pub fn disable(&self) {
        if self.enabled.swap(false, Ordering::AcqRel) {
            debug!("context store disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Makes `set` write to the root of the chain by default.
    pub fn enable_linked_top(&self) {
        self.linked_top.store(true, Ordering::Release);
    }

    pub fn disable_linked_top(&self) {
        self.linked_top.store(false, Ordering::Release);
    }

    pub fn is_linked_top(&self) -> bool {
        self.linked_top.load(Ordering::Acquire)
    }

    /// Id of the execution running on this thread.
    ///
    /// This is the id of the last `on_before` seen on this thread. Before
    /// any such event, or while the store is disabled, it is whatever the
    /// scheduler reports.
    pub fn current_id(&self) -> Option<ExecutionId> {
        if !self.is_enabled() {
            return (self.fallback)();
        }
        self.tracker.tracked().or_else(self.fallback)
    }

    /// Node of the current execution, if it is tracked.
    pub fn current_data(&self) -> Option<Arc<ContextNode>> {
        self.registry.get(self.current_id()?)
    }

    /// Stores `value` under `key` for the current execution.
    ///
    /// With `linked_top` set to `Some(true)`, or `None` while linked-top is
    /// the default, the value goes to the root-most ancestor and becomes
    /// visible to the whole chain.
    ///
    /// Returns `Ok(false)` when there is no current node.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`] if `key` is one of [`RESERVED_KEYS`]. Nothing
    /// is written in that case.
    pub fn set<V>(&self, key: &str, value: V, linked_top: Option<bool>) -> Result<bool>
    where
        V: Any + Send + Sync,
    {
        if RESERVED_KEYS.contains(&key) {
            return Err(Error::InvalidKey(key.to_owned()));
        }

        let Some(node) = self.current_data() else {
            trace!(key, "set without a current context");
            return Ok(false);
        };

        let target = if linked_top.unwrap_or_else(|| self.is_linked_top()) {
            node.top()
        } else {
            node
        };

        trace!(key, id = %target.id(), "set");
        target.insert(key.to_owned(), Arc::new(value));
        Ok(true)
    }

    /// Looks `key` up on the current node, then on its ancestors.
    ///
    /// The nearest node holding `key` decides the result: if its value is
    /// not a `T`, the lookup yields `None` without searching further.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let node = self.current_data()?;
        let value = node.resolve(key);
        trace!(key, id = %node.id(), found = value.is_some(), "get");
        value?.downcast::<T>().ok()
    }

    /// Like [`get`](Self::get), but skips the current node's own data.
    pub fn get_from_parent<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let parent = self.current_data()?.parent()?;
        parent.resolve(key)?.downcast::<T>().ok()
    }

    /// Drops the current node from the registry.
    ///
    /// Ancestors and descendants are untouched; descendants keep resolving
    /// keys through the removed node. Returns `true` if a node was removed.
    pub fn remove(&self) -> bool {
        let Some(id) = self.current_id() else {
            return false;
        };

        let removed = self.registry.destroy(id).is_some();
        if removed {
            debug!(%id, "context removed");
        }
        removed
    }

    /// Time elapsed since the node of `id` was created.
    ///
    /// `id` defaults to the current execution. `None` means the node is
    /// unknown, not a zero duration.
    ///
    /// # Aliases
    ///
    /// Known as `use` in other async-local-storage libraries, where an
    /// unknown node is reported as `-1`.
    #[doc(alias = "use")]
    pub fn elapsed(&self, id: Option<ExecutionId>) -> Option<Duration> {
        let id = id.or_else(|| self.current_id())?;
        let node = self.registry.get(id)?;
        Some(self.clock.difference(node.created_at()))
    }

    /// Cuts the current node loose from its ancestors.
    ///
    /// The node becomes the root of a new logical unit of work: values set
    /// afterwards with linked-top land on it, and ancestors' values are no
    /// longer visible. There is no way to reattach.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveContext`] if the current execution has no node.
    pub fn scope(&self) -> Result<()> {
        let node = self.current_data().ok_or(Error::NoActiveContext)?;
        if node.detach() {
            debug!(id = %node.id(), "context scoped");
        }
        Ok(())
    }

    /// Root-most ancestor of the current node.
    pub fn top(&self) -> Option<Arc<ContextNode>> {
        Some(self.current_data()?.top())
    }

    /// Number of live nodes.
    pub fn size(&self) -> usize {
        self.registry.size()
    }

    /// Every live node, for diagnostics.
    pub fn all_data(&self) -> Snapshot {
        self.registry.snapshot()
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextStore")
            .field("enabled", &self.is_enabled())
            .field("linked_top", &self.is_linked_top())
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

impl LifecycleHooks for ContextStore {
    /// Creates the node of `id`.
    ///
    /// The parent is `trigger` when it names another execution. A missing
    /// or self-referencing trigger falls back to the execution last seen
    /// running on this thread.
    fn on_init(&self, id: ExecutionId, kind: ResourceKind, trigger: Option<ExecutionId>) {
        if !self.is_enabled() {
            return;
        }

        let parent = match trigger {
            Some(trigger) if trigger != id => Some(trigger),
            _ => self.tracker.tracked(),
        };

        let node = self.registry.create(id, self.clock.now(), parent);
        debug!(
            %id,
            %kind,
            trigger = ?trigger.map(|t| t.as_u64()),
            parent = ?node.parent().map(|p| p.id().as_u64()),
            "context created"
        );
    }

    fn on_before(&self, id: ExecutionId) {
        if !self.is_enabled() {
            return;
        }

        trace!(%id, "before");
        self.tracker.track(id);
    }

    fn on_destroy(&self, id: ExecutionId) {
        if !self.is_enabled() {
            return;
        }

        if self.registry.destroy(id).is_some() {
            debug!(%id, "context destroyed");
        }
    }
}

/// Builder for [`ContextStore`].
///
/// # Examples
///
/// ```rust,ignore
/// let store = ContextStore::builder()
///     .linked_top(true)
///     .clock(Arc::new(ManualClock::new()))
///     .build();
/// ```
pub struct ContextStoreBuilder {
    linked_top: bool,
    clock: Option<Arc<dyn Clock>>,
    fallback: FallbackFn,
}

impl ContextStoreBuilder {
    /// Defaults: linked-top off, [`MonotonicClock`], and
    /// [`execution_id`](crate::execution_id) as fallback.
    pub fn new() -> Self {
        Self {
            linked_top: false,
            clock: None,
            fallback: runtime::execution_id,
        }
    }

    /// Applies settings from a [`StoreConfig`].
    pub fn config(mut self, config: &StoreConfig) -> Self {
        self.linked_top = config.linked_top;
        self
    }

    pub fn linked_top(mut self, enabled: bool) -> Self {
        self.linked_top = enabled;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets where the current execution id comes from before the first
    /// `on_before` event on a thread.
    pub fn fallback(mut self, fallback: FallbackFn) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn build(self) -> ContextStore {
        ContextStore {
            registry: Registry::new(),
            tracker: Tracker::new(),
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(MonotonicClock::new())),
            fallback: self.fallback,
            enabled: AtomicBool::new(false),
            linked_top: AtomicBool::new(self.linked_top),
        }
    }
}

impl Default for ContextStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
