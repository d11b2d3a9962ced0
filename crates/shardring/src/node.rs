//! Node abstractions for the hash ring.
//!
//! A node is one shard of the key space: it sits at a fixed position on the
//! ring and stores the key-value pairs whose hashes it owns. Nodes are
//! identified by a compact `NodeId` that is cheap to compare and hash.

use crate::position::Position;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact identifier for a node in the ring.
///
/// Ids come from a monotonically increasing counter owned by the ring and
/// are never reused, even after the node is removed.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A shard participating in the ring.
///
/// The store is a concurrent map so that writes routed to the node only need
/// shared access to the ring.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    position: Position,
    store: DashMap<String, String>,
}

impl Node {
    /// Construct an empty node at the given position.
    pub fn new(id: NodeId, position: Position) -> Self {
        Self {
            id,
            position,
            store: DashMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Insert or overwrite a value.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.store.insert(key.into(), value.into());
    }

    /// Returns a copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    /// Removes `key`, returning its value if it was present.
    pub fn delete(&self, key: &str) -> Option<String> {
        self.store.remove(key).map(|(_, value)| value)
    }

    /// Snapshot of all keys currently stored on the node.
    ///
    /// The returned vector is detached from the store, so callers may mutate
    /// the node while walking it.
    pub fn keys(&self) -> Vec<String> {
        self.store.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Point-in-time description of the node.
    pub fn info(&self) -> NodeInfo {
        NodeInfo {
            id: self.id,
            position: self.position.value(),
            keys: self.len(),
        }
    }
}

/// Serializable summary of a node, as reported by ring snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub position: u64,
    /// Number of keys stored on the node.
    pub keys: usize,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[node {} @ {}: {} keys]", self.id, self.position, self.keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node::new(NodeId(1), Position::new(12))
    }

    #[test]
    fn test_put_get_overwrite() {
        let node = node();
        assert_eq!(node.get("cat"), None);

        node.put("cat", "white");
        assert_eq!(node.get("cat").as_deref(), Some("white"));

        node.put("cat", "black");
        assert_eq!(node.get("cat").as_deref(), Some("black"));
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_delete_is_noop_when_absent() {
        let node = node();
        assert_eq!(node.delete("missing"), None);

        node.put("dog", "brown");
        assert_eq!(node.delete("dog").as_deref(), Some("brown"));
        assert!(node.is_empty());
    }

    #[test]
    fn test_keys_snapshot_survives_mutation() {
        let node = node();
        for i in 0..10 {
            node.put(format!("k{}", i), "v");
        }

        let keys = node.keys();
        assert_eq!(keys.len(), 10);

        // Draining the store while walking the snapshot must not deadlock.
        for key in &keys {
            assert!(node.delete(key).is_some());
        }
        assert!(node.is_empty());
    }

    #[test]
    fn test_info() {
        let node = node();
        node.put("a", "1");
        node.put("b", "2");

        let info = node.info();
        assert_eq!(info, NodeInfo { id: NodeId(1), position: 12, keys: 2 });
        assert_eq!(info.to_string(), "[node n1 @ 12: 2 keys]");
    }
}
