use super::node::ContextNode;
use crate::clock::Timestamp;
use crate::hooks::ExecutionId;

use serde::ser::{Serialize, SerializeMap, Serializer};

use std::collections::BTreeMap;
use std::sync::Arc;

/// Point-in-time view of every live context node.
///
/// Meant for diagnostics. Nodes are shared with the store, so user data
/// read through them reflects later writes, but the set of ids does not
/// change once the snapshot is taken.
///
/// Serializes as a map from id to `{ created, parent, keys }`; values are
/// opaque and only their keys are rendered.
#[derive(Clone, Default)]
pub struct Snapshot {
    nodes: BTreeMap<ExecutionId, Arc<ContextNode>>,
}

impl Snapshot {
    pub(crate) fn new(nodes: impl IntoIterator<Item = (ExecutionId, Arc<ContextNode>)>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ExecutionId) -> Option<&Arc<ContextNode>> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: ExecutionId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterates nodes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ExecutionId, &Arc<ContextNode>)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Renders the snapshot as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(serde::Serialize)]
struct NodeView {
    created: Timestamp,
    parent: Option<ExecutionId>,
    keys: Vec<String>,
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for (id, node) in &self.nodes {
            let view = NodeView {
                created: node.created_at(),
                parent: node.parent().map(|parent| parent.id()),
                keys: node.keys(),
            };
            map.serialize_entry(id, &view)?;
        }
        map.end()
    }
}
