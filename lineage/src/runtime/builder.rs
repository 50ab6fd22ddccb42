use super::core::Runtime;
use crate::context;
use crate::hooks::{HookSet, LifecycleHooks};

use std::sync::Arc;

/// Builder for configuring and creating a runtime.
///
/// By default the process-wide context store is attached, so that
/// [`context::enable`] is all it takes to start tracking. Additional hook
/// sinks receive the same events.
///
/// # Examples
///
/// ```rust,ignore
/// let store = Arc::new(ContextStore::new());
/// store.enable();
///
/// let runtime = RuntimeBuilder::new()
///     .global_context(false)
///     .hooks(store.clone())
///     .build();
/// ```
pub struct RuntimeBuilder {
    hooks: Vec<Arc<dyn LifecycleHooks>>,

    /// Whether the process-wide store receives this runtime's events.
    global_context: bool,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            hooks: Vec::new(),
            global_context: true,
        }
    }

    /// Adds a sink for lifecycle events.
    pub fn hooks(mut self, hooks: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    /// Attaches or detaches the process-wide store. Attached by default.
    pub fn global_context(mut self, attach: bool) -> Self {
        self.global_context = attach;
        self
    }

    pub fn build(self) -> Runtime {
        let mut sinks = Vec::with_capacity(self.hooks.len() + 1);
        if self.global_context {
            sinks.push(context::global().clone() as Arc<dyn LifecycleHooks>);
        }
        sinks.extend(self.hooks);

        Runtime::new(HookSet::new(sinks))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
