use super::node::ContextNode;
use super::snapshot::Snapshot;
use crate::clock::Timestamp;
use crate::hooks::ExecutionId;

use parking_lot::Mutex;

use std::collections::HashMap;
use std::sync::Arc;

/// Flat table of live context nodes keyed by execution id.
///
/// The registry is the only place nodes are inserted or deleted. Removing
/// a node never touches its ancestors or descendants.
pub(crate) struct Registry {
    nodes: Mutex<HashMap<ExecutionId, Arc<ContextNode>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts a node for `id`.
    ///
    /// `parent` becomes the parent link when it names a different, live
    /// node; otherwise the new node is a root. A stale entry under a reused
    /// id is replaced.
    pub(crate) fn create(
        &self,
        id: ExecutionId,
        created_at: Timestamp,
        parent: Option<ExecutionId>,
    ) -> Arc<ContextNode> {
        let mut nodes = self.nodes.lock();

        let parent = parent
            .filter(|parent| *parent != id)
            .and_then(|parent| nodes.get(&parent).cloned());

        let node = Arc::new(ContextNode::new(id, created_at, parent));
        nodes.insert(id, node.clone());
        node
    }

    /// Removes the node for `id`, if any.
    pub(crate) fn destroy(&self, id: ExecutionId) -> Option<Arc<ContextNode>> {
        self.nodes.lock().remove(&id)
    }

    pub(crate) fn get(&self, id: ExecutionId) -> Option<Arc<ContextNode>> {
        self.nodes.lock().get(&id).cloned()
    }

    pub(crate) fn size(&self) -> usize {
        self.nodes.lock().len()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.nodes
                .lock()
                .iter()
                .map(|(id, node)| (*id, node.clone())),
        )
    }
}
