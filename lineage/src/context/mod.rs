//! Execution-context-scoped storage.
//!
//! Every asynchronous operation observed by the store gets a
//! [`ContextNode`]. A node points to the node that was running when it was
//! created, so nodes form a causal tree mirroring which task spawned which.
//! Reads start at the node of the current execution and walk toward the
//! root; writes go to the current node, or to the root with linked-top.
//!
//! The free functions of this module operate on a process-wide
//! [`ContextStore`] that every [`Runtime`](crate::Runtime) reports to. It
//! starts disabled; call [`enable`] once at startup. Its linked-top default
//! is seeded from [`StoreConfig::from_env`].
//!
//! ```rust,ignore
//! use lineage::context;
//!
//! #[lineage::main(context)]
//! async fn main() {
//!     context::scope().unwrap();
//!     context::set("user", "alice".to_owned(), Some(true)).unwrap();
//!
//!     lineage::task::spawn(async {
//!         assert_eq!(context::get::<String>("user").as_deref().map(String::as_str), Some("alice"));
//!     })
//!     .await;
//! }
//! ```

mod config;
mod node;
mod registry;
mod snapshot;
mod store;
mod tracker;

pub use config::StoreConfig;
pub use node::ContextNode;
pub use snapshot::Snapshot;
pub use store::{ContextStore, ContextStoreBuilder, FallbackFn, RESERVED_KEYS};

use crate::error::Result;
use crate::hooks::ExecutionId;

use std::any::Any;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

static GLOBAL: LazyLock<Arc<ContextStore>> = LazyLock::new(|| {
    Arc::new(
        ContextStore::builder()
            .config(&StoreConfig::from_env())
            .build(),
    )
});

/// The process-wide store.
pub fn global() -> &'static Arc<ContextStore> {
    &GLOBAL
}

/// See [`ContextStore::enable`].
pub fn enable() {
    global().enable()
}

/// See [`ContextStore::disable`].
pub fn disable() {
    global().disable()
}

pub fn is_enabled() -> bool {
    global().is_enabled()
}

/// See [`ContextStore::enable_linked_top`].
pub fn enable_linked_top() {
    global().enable_linked_top()
}

/// See [`ContextStore::disable_linked_top`].
pub fn disable_linked_top() {
    global().disable_linked_top()
}

/// See [`ContextStore::current_id`].
pub fn current_id() -> Option<ExecutionId> {
    global().current_id()
}

/// See [`ContextStore::current_data`].
pub fn current_data() -> Option<Arc<ContextNode>> {
    global().current_data()
}

/// See [`ContextStore::set`].
pub fn set<V: Any + Send + Sync>(key: &str, value: V, linked_top: Option<bool>) -> Result<bool> {
    global().set(key, value, linked_top)
}

/// See [`ContextStore::get`].
pub fn get<T: Any + Send + Sync>(key: &str) -> Option<Arc<T>> {
    global().get(key)
}

/// See [`ContextStore::get_from_parent`].
pub fn get_from_parent<T: Any + Send + Sync>(key: &str) -> Option<Arc<T>> {
    global().get_from_parent(key)
}

/// See [`ContextStore::remove`].
pub fn remove() -> bool {
    global().remove()
}

/// See [`ContextStore::elapsed`].
#[doc(alias = "use")]
pub fn elapsed(id: Option<ExecutionId>) -> Option<Duration> {
    global().elapsed(id)
}

/// See [`ContextStore::scope`].
pub fn scope() -> Result<()> {
    global().scope()
}

/// See [`ContextStore::top`].
pub fn top() -> Option<Arc<ContextNode>> {
    global().top()
}

/// See [`ContextStore::size`].
pub fn size() -> usize {
    global().size()
}

/// See [`ContextStore::all_data`].
pub fn all_data() -> Snapshot {
    global().all_data()
}
