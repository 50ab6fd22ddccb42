use crate::clock::Timestamp;
use crate::hooks::ExecutionId;

use parking_lot::Mutex;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A value stored in a context node.
pub(crate) type Value = Arc<dyn Any + Send + Sync>;

/// The tracked data of one asynchronous operation.
///
/// Bookkeeping (`id`, creation time, parent link) and user data live in
/// separate fields; user keys can never overwrite bookkeeping.
///
/// A node keeps its parent reachable even after the parent has been
/// removed from the registry, so descendants keep resolving keys through
/// it. Nodes are created and deleted by the store only; this type exposes
/// read access.
pub struct ContextNode {
    id: ExecutionId,
    created_at: Timestamp,

    /// Node that was current when this one was created. Only ever cleared.
    parent: Mutex<Option<Arc<ContextNode>>>,

    data: Mutex<HashMap<String, Value>>,
}

impl ContextNode {
    pub(crate) fn new(
        id: ExecutionId,
        created_at: Timestamp,
        parent: Option<Arc<ContextNode>>,
    ) -> Self {
        Self {
            id,
            created_at,
            parent: Mutex::new(parent),
            data: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> ExecutionId {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the parent node, or `None` for a root.
    pub fn parent(&self) -> Option<Arc<ContextNode>> {
        self.parent.lock().clone()
    }

    /// Returns `true` if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.lock().is_none()
    }

    /// Returns the value this node itself holds for `key`.
    ///
    /// Ancestors are not consulted. Returns `None` if the key is missing
    /// or holds a value of another type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.raw(key)?.downcast::<T>().ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Keys set directly on this node, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.lock().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Walks parent links up to the root-most ancestor.
    ///
    /// Returns `self` when the node is a root.
    pub fn top(self: &Arc<Self>) -> Arc<ContextNode> {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Number of parent links between this node and its root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut next = self.parent();
        while let Some(node) = next {
            depth += 1;
            next = node.parent();
        }
        depth
    }

    pub(crate) fn raw(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    pub(crate) fn insert(&self, key: String, value: Value) {
        self.data.lock().insert(key, value);
    }

    /// Severs the parent link. Returns `true` if there was one.
    pub(crate) fn detach(&self) -> bool {
        self.parent.lock().take().is_some()
    }

    /// Resolves `key` on this node, then on each ancestor in turn.
    ///
    /// Stops at the first node that holds the key.
    pub(crate) fn resolve(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.raw(key) {
            return Some(value);
        }

        let mut next = self.parent();
        while let Some(node) = next {
            if let Some(value) = node.raw(key) {
                return Some(value);
            }
            next = node.parent();
        }
        None
    }
}

impl fmt::Debug for ContextNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextNode")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("parent", &self.parent().map(|p| p.id()))
            .field("keys", &self.keys())
            .finish()
    }
}
