//! Hash ring data structure.
//!
//! # Ownership rule
//!
//! A hashed value `h` is owned by the first node, in ascending position
//! order, whose position is **strictly greater** than `h`. When no such node
//! exists ownership wraps around to the node with the smallest position.
//! A key hashing exactly onto a node's position therefore belongs to the
//! next node clockwise.
//!
//! ```text
//!        h=7              h=15
//!   0 ----|--[5]----|--[12]--|----[20]-----[29]-- 31
//!                   owner ^          ^ owner
//! ```
//!
//! # Performance
//!
//! - **Lookup**: O(log n) range query on a `BTreeMap`
//! - **Add/remove**: O(log n), no re-sorting

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::node::{Node, NodeId};
use crate::position::{Position, PositionSource};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Bound::{Excluded, Unbounded};
use tracing::{debug, info, trace};

/// Ordered collection of live nodes keyed by ring position.
///
/// # Invariants
///
/// - Every live node has a unique position in `[0, ring_size)`
/// - `index` maps exactly the live node ids to their positions
/// - Node ids are never reused
///
/// The ring does not touch node data; moving keys after a membership change
/// is the job of the [`Rebalancer`](crate::rebalance::Rebalancer).
pub struct HashRing {
    ring_size: u64,
    /// Live nodes sorted by position.
    nodes: BTreeMap<Position, Node>,
    /// Node id to position, for removal by id.
    index: HashMap<NodeId, Position>,
    next_id: u64,
    positions: Box<dyn PositionSource>,
    max_position_attempts: u32,
}

impl HashRing {
    /// Create an empty ring over `[0, ring_size)`.
    pub fn new(ring_size: u64, positions: Box<dyn PositionSource>) -> Result<Self> {
        let config = RingConfig::new(ring_size);
        Self::with_config(&config, positions)
    }

    /// Create an empty ring from a configuration.
    ///
    /// `initial_nodes` is not applied here; the partitioner builder adds
    /// those nodes once the ring exists.
    pub fn with_config(config: &RingConfig, positions: Box<dyn PositionSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ring_size: config.ring_size,
            nodes: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 0,
            positions,
            max_position_attempts: config.max_position_attempts,
        })
    }

    pub fn ring_size(&self) -> u64 {
        self.ring_size
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Reduces a full-width hash into the ring space.
    #[inline]
    pub fn reduce(&self, hash: u64) -> Position {
        Position::from_hash(hash, self.ring_size)
    }

    /// Returns the node with the given id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).and_then(|position| self.nodes.get(position))
    }

    /// Live nodes in ascending position order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Add a node at a position proposed by the position source.
    ///
    /// The source is asked up to `max_position_attempts` times for an unused
    /// slot. If every proposal collides, the ring probes clockwise from the
    /// last proposal, which always terminates because at least one slot is
    /// free.
    pub fn add_node(&mut self) -> Result<NodeId> {
        if self.nodes.len() as u128 >= u128::from(self.ring_size) {
            return Err(Error::RingFull {
                ring_size: self.ring_size,
            });
        }

        let id = NodeId(self.next_id);
        let position = self.free_position(id);

        self.next_id += 1;
        self.nodes.insert(position, Node::new(id, position));
        self.index.insert(id, position);

        info!(node = %id, %position, nodes = self.nodes.len(), "node added to ring");
        Ok(id)
    }

    fn free_position(&mut self, id: NodeId) -> Position {
        let mut candidate = Position::new(0);
        for attempt in 0..self.max_position_attempts {
            candidate = self.positions.next_position(id, self.ring_size);
            if !self.nodes.contains_key(&candidate) {
                return candidate;
            }
            trace!(node = %id, position = %candidate, attempt, "position taken");
        }

        debug!(
            node = %id,
            source = self.positions.name(),
            attempts = self.max_position_attempts,
            "position source exhausted, probing clockwise"
        );
        while self.nodes.contains_key(&candidate) {
            candidate = candidate.next(self.ring_size);
        }
        candidate
    }

    /// Remove a node, freeing its position for future nodes.
    ///
    /// Returns the removed node together with whatever data it still holds.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        let position = self.index.remove(&id).ok_or(Error::NodeNotFound(id))?;
        let node = self
            .nodes
            .remove(&position)
            .ok_or(Error::NodeNotFound(id))?;

        info!(node = %id, %position, nodes = self.nodes.len(), "node removed from ring");
        Ok(node)
    }

    /// Returns the node owning a hashed position.
    pub fn owner_node(&self, position: Position) -> Result<&Node> {
        self.nodes
            .range((Excluded(position), Unbounded))
            .next()
            .or_else(|| self.nodes.iter().next())
            .map(|(_, node)| node)
            .ok_or(Error::EmptyRing)
    }

    /// Returns the id of the node owning a hashed position.
    pub fn owner(&self, position: Position) -> Result<NodeId> {
        self.owner_node(position).map(Node::id)
    }

    /// Returns the node that would own a key hashed exactly at `position`.
    ///
    /// For a live node's own position this is the next node clockwise, or
    /// the node itself when it is alone on the ring.
    pub fn successor(&self, position: Position) -> Result<NodeId> {
        self.owner(position)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("ring_size", &self.ring_size)
            .field("positions", &self.nodes.keys().collect::<Vec<_>>())
            .field("source", &self.positions.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::ScriptedPositions;

    fn ring(ring_size: u64, positions: &[u64]) -> HashRing {
        let source = ScriptedPositions::new(positions.iter().copied());
        let mut ring = HashRing::new(ring_size, Box::new(source)).unwrap();
        for _ in positions {
            ring.add_node().unwrap();
        }
        ring
    }

    #[test]
    fn test_owner_strictly_greater() {
        let ring = ring(32, &[5, 12, 20, 29]);
        let at = |p: u64| {
            let owner = ring.owner(Position(p)).unwrap();
            ring.get(owner).unwrap().position().value()
        };

        assert_eq!(at(7), 12);
        assert_eq!(at(12), 20); // exact hit belongs to the next node
        assert_eq!(at(15), 20);
        assert_eq!(at(0), 5);
        assert_eq!(at(29), 5); // wraps
        assert_eq!(at(31), 5);
    }

    #[test]
    fn test_collision_falls_back_to_probe() {
        // Every proposal is 3, so the second node must probe to 4.
        let source = ScriptedPositions::new(std::iter::repeat(3).take(16));
        let config = RingConfig::new(8).with_max_position_attempts(4);
        let mut ring = HashRing::with_config(&config, Box::new(source)).unwrap();

        let first = ring.add_node().unwrap();
        let second = ring.add_node().unwrap();
        assert_eq!(ring.get(first).unwrap().position(), Position(3));
        assert_eq!(ring.get(second).unwrap().position(), Position(4));
    }

    #[test]
    fn test_probe_wraps_past_end() {
        let source = ScriptedPositions::new(std::iter::repeat(3).take(16));
        let config = RingConfig::new(4).with_max_position_attempts(1);
        let mut ring = HashRing::with_config(&config, Box::new(source)).unwrap();

        for _ in 0..4 {
            ring.add_node().unwrap();
        }
        let positions: Vec<u64> = ring.nodes().map(|n| n.position().value()).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut ring = ring(32, &[5, 12]);
        ring.remove_node(NodeId(1)).unwrap();
        let id = ring.add_node().unwrap();
        assert_eq!(id, NodeId(2));
    }
}
