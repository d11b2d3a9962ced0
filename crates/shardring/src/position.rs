//! Ring positions and the strategies that place new nodes on the ring.
//!
//! Positions are integers in the bounded ring space `[0, R)`. Both node
//! positions and key hashes are reduced into that space before comparison.

use crate::node::NodeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A position on the ring, always smaller than the ring size it was
/// created for.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Position(pub u64);

impl Position {
    #[inline]
    pub fn new(value: u64) -> Self {
        Position(value)
    }

    /// Reduces a full-width hash into the ring space.
    #[inline]
    pub fn from_hash(hash: u64, ring_size: u64) -> Self {
        Position(hash % ring_size)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The next slot clockwise, wrapping from `ring_size - 1` to zero.
    #[inline]
    pub fn next(&self, ring_size: u64) -> Self {
        Position((self.0 + 1) % ring_size)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proposes positions for nodes joining the ring.
///
/// A source only proposes; the ring rejects occupied slots and asks again,
/// so implementations are free to return collisions.
pub trait PositionSource: Send + Sync {
    /// Proposes a position in `[0, ring_size)` for the node `node`.
    fn next_position(&mut self, node: NodeId, ring_size: u64) -> Position;

    /// Returns the name of this source (for logging).
    fn name(&self) -> &'static str;
}

/// Uniformly random positions drawn from a seedable generator.
///
/// The same seed always yields the same sequence of proposals, which makes
/// ring layouts reproducible in tests.
#[derive(Clone, Debug)]
pub struct SeededPositions {
    rng: StdRng,
}

impl SeededPositions {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds the generator from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl PositionSource for SeededPositions {
    fn next_position(&mut self, _node: NodeId, ring_size: u64) -> Position {
        Position::new(self.rng.random_range(0..ring_size))
    }

    fn name(&self) -> &'static str {
        "SeededPositions"
    }
}

/// Positions derived from a hash of the node id.
///
/// A node's first proposal depends only on its id. Repeated proposals for the
/// same node (after a collision) salt the hash with an attempt counter.
#[derive(Clone, Debug, Default)]
pub struct HashedPositions {
    last: Option<NodeId>,
    attempt: u64,
}

impl HashedPositions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionSource for HashedPositions {
    fn next_position(&mut self, node: NodeId, ring_size: u64) -> Position {
        if self.last == Some(node) {
            self.attempt += 1;
        } else {
            self.last = Some(node);
            self.attempt = 0;
        }

        let mut hasher = SipHasher13::new();
        node.hash(&mut hasher);
        self.attempt.hash(&mut hasher);
        Position::from_hash(hasher.finish(), ring_size)
    }

    fn name(&self) -> &'static str {
        "HashedPositions"
    }
}

/// Replays a fixed list of positions, then falls back to seeded
/// pseudo-random proposals once the list is exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedPositions {
    script: VecDeque<u64>,
    fallback: SeededPositions,
}

impl ScriptedPositions {
    pub fn new(positions: impl IntoIterator<Item = u64>) -> Self {
        Self {
            script: positions.into_iter().collect(),
            fallback: SeededPositions::new(0),
        }
    }

    /// Number of scripted positions not yet handed out.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl PositionSource for ScriptedPositions {
    fn next_position(&mut self, node: NodeId, ring_size: u64) -> Position {
        match self.script.pop_front() {
            Some(value) => Position::from_hash(value, ring_size),
            None => self.fallback.next_position(node, ring_size),
        }
    }

    fn name(&self) -> &'static str {
        "ScriptedPositions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wraps() {
        assert_eq!(Position::from_hash(35, 32), Position(3));
        assert_eq!(Position(31).next(32), Position(0));
        assert_eq!(Position(4).next(32), Position(5));
        assert!(Position(5) < Position(12));
    }

    #[test]
    fn test_seeded_positions_reproducible() {
        let mut a = SeededPositions::new(42);
        let mut b = SeededPositions::new(42);
        for i in 0..16 {
            let pa = a.next_position(NodeId(i), 1024);
            let pb = b.next_position(NodeId(i), 1024);
            assert_eq!(pa, pb);
            assert!(pa.value() < 1024);
        }
    }

    #[test]
    fn test_seeded_positions_cover_small_ring() {
        let mut source = SeededPositions::new(9);
        let mut seen = [false; 4];
        for i in 0..256 {
            seen[source.next_position(NodeId(i), 4).value() as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn test_entropy_seeded_positions_in_range() {
        let mut source = SeededPositions::from_entropy();
        for i in 0..64 {
            assert!(source.next_position(NodeId(i), 7).value() < 7);
        }
    }

    #[test]
    fn test_hashed_positions_depend_on_node() {
        let mut source = HashedPositions::new();
        let first = source.next_position(NodeId(3), u64::MAX);

        let mut other = HashedPositions::new();
        assert_eq!(other.next_position(NodeId(3), u64::MAX), first);

        // A retry for the same node must propose something else.
        let retry = source.next_position(NodeId(3), u64::MAX);
        assert_ne!(retry, first);
    }

    #[test]
    fn test_scripted_positions_then_fallback() {
        let mut source = ScriptedPositions::new([5, 12, 40]);
        assert_eq!(source.next_position(NodeId(0), 32), Position(5));
        assert_eq!(source.next_position(NodeId(1), 32), Position(12));
        assert_eq!(source.next_position(NodeId(2), 32), Position(8));
        assert_eq!(source.remaining(), 0);

        let fallback = source.next_position(NodeId(3), 32);
        assert!(fallback.value() < 32);
    }
}
