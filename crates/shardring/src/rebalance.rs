//! Key migration on ring membership changes.
//!
//! When a node joins at position `p`, only keys held by its successor can
//! change owner: those now owned by the new node move over. When a node
//! leaves, all of its keys move to its successor. No other node's data is
//! touched, and the total number of stored keys is unchanged (except when
//! the last node leaves and there is nowhere to move its keys).
//!
//! The rebalancer applies the same ownership rule as routing (it asks the
//! [`HashRing`] for owners) so keys never become unreachable after a move.

use crate::error::{Error, Result};
use crate::hash::HashFunction;
use crate::node::{Node, NodeId};
use crate::ring::HashRing;
use serde::Serialize;
use tracing::{debug, warn};

/// Summary of one migration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Migration {
    /// Node that gave up keys.
    pub from: NodeId,
    /// Node that received them; `None` when the last node left the ring.
    pub to: Option<NodeId>,
    /// Number of keys relocated.
    pub moved: usize,
    /// Number of keys discarded because no node was left to take them.
    pub dropped: usize,
}

/// Moves the minimal set of keys after a membership change.
pub struct Rebalancer<'a> {
    hasher: &'a dyn HashFunction,
}

impl<'a> Rebalancer<'a> {
    pub fn new(hasher: &'a dyn HashFunction) -> Self {
        Self { hasher }
    }

    /// Pulls keys into a node that has just been inserted into the ring.
    ///
    /// Returns `None` when the node is alone on the ring and there is nothing
    /// to take over.
    pub fn on_add(&self, ring: &HashRing, added: NodeId) -> Result<Option<Migration>> {
        let new_node = ring.get(added).ok_or(Error::NodeNotFound(added))?;
        let successor = ring.successor(new_node.position())?;
        if successor == added {
            return Ok(None);
        }
        let source = ring.get(successor).ok_or(Error::NodeNotFound(successor))?;

        let mut moved = 0;
        for key in source.keys() {
            let position = ring.reduce(self.hasher.hash(key.as_bytes()));
            if ring.owner(position)? != added {
                continue;
            }
            if transfer(source, new_node, key) {
                moved += 1;
            }
        }

        let migration = Migration {
            from: successor,
            to: Some(added),
            moved,
            dropped: 0,
        };
        debug!(from = %successor, to = %added, moved, "keys migrated to joining node");
        Ok(Some(migration))
    }

    /// Hands every key of a leaving node to its successor.
    ///
    /// Must run while the node is still in the ring; the caller removes it
    /// afterwards. If the node is the last one, its keys are discarded.
    pub fn on_remove(&self, ring: &HashRing, leaving: NodeId) -> Result<Migration> {
        let node = ring.get(leaving).ok_or(Error::NodeNotFound(leaving))?;
        let successor = ring.successor(node.position())?;

        if successor == leaving {
            let dropped = node.len();
            if dropped > 0 {
                warn!(node = %leaving, dropped, "last node left the ring, its keys are discarded");
            }
            return Ok(Migration {
                from: leaving,
                to: None,
                moved: 0,
                dropped,
            });
        }

        let target = ring.get(successor).ok_or(Error::NodeNotFound(successor))?;
        let mut moved = 0;
        for key in node.keys() {
            if transfer(node, target, key) {
                moved += 1;
            }
        }

        debug!(from = %leaving, to = %successor, moved, "keys migrated from leaving node");
        Ok(Migration {
            from: leaving,
            to: Some(successor),
            moved,
            dropped: 0,
        })
    }
}

/// Moves one key between nodes. Returns false if the key vanished from the
/// source in the meantime.
fn transfer(from: &Node, to: &Node, key: String) -> bool {
    match from.delete(&key) {
        Some(value) => {
            to.put(key, value);
            true
        }
        None => false,
    }
}
