//! Partitioner: the public entry point for routing keys across the ring.
//!
//! # Locking
//!
//! The ring sits behind a single reader-writer lock:
//!
//! - `insert`, `get`, `remove` and snapshots take the **shared** lock. Node
//!   stores are concurrent maps, so routed writes only need shared access to
//!   the ring.
//! - `add_node` and `remove_node` hold the **exclusive** lock across the
//!   membership change and the key migration, so no reader can observe a key
//!   on both nodes or on neither.

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::hash::HashFunction;
use crate::node::{NodeId, NodeInfo};
use crate::position::{Position, PositionSource, SeededPositions};
use crate::rebalance::{Migration, Rebalancer};
use crate::ring::HashRing;
use parking_lot::RwLock;
use std::fmt;
use tracing::info;

/// Key-value store partitioned over a consistent hash ring.
///
/// # Example
///
/// ```rust
/// use shardring::{Partitioner, RingConfig};
///
/// let partitioner = Partitioner::new(RingConfig::new(64).with_initial_nodes(3))?;
/// partitioner.insert("cat", "white")?;
/// assert_eq!(partitioner.get("cat")?.as_deref(), Some("white"));
///
/// let id = partitioner.add_node()?;
/// partitioner.remove_node(id)?;
/// assert_eq!(partitioner.get("cat")?.as_deref(), Some("white"));
/// # Ok::<(), shardring::Error>(())
/// ```
pub struct Partitioner {
    ring: RwLock<HashRing>,
    hasher: Box<dyn HashFunction>,
}

impl Partitioner {
    /// Build a partitioner from configuration alone.
    pub fn new(config: RingConfig) -> Result<Self> {
        PartitionerBuilder::new(config).build()
    }

    pub fn builder(config: RingConfig) -> PartitionerBuilder {
        PartitionerBuilder::new(config)
    }

    /// Ring position a key hashes to.
    pub fn position(&self, key: &str) -> Position {
        self.ring.read().reduce(self.hasher.hash(key.as_bytes()))
    }

    /// Store a value on the node owning `key`, overwriting any previous
    /// value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let ring = self.ring.read();
        let position = ring.reduce(self.hasher.hash(key.as_bytes()));
        ring.owner_node(position)?.put(key, value);
        Ok(())
    }

    /// Returns the value stored under `key`, or `None` if it is absent.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let ring = self.ring.read();
        let position = ring.reduce(self.hasher.hash(key.as_bytes()));
        Ok(ring.owner_node(position)?.get(key))
    }

    /// Deletes `key`, returning its value if it was present.
    pub fn remove(&self, key: &str) -> Result<Option<String>> {
        let ring = self.ring.read();
        let position = ring.reduce(self.hasher.hash(key.as_bytes()));
        Ok(ring.owner_node(position)?.delete(key))
    }

    /// Returns the node currently responsible for `key`.
    pub fn owner_of(&self, key: &str) -> Result<NodeId> {
        let ring = self.ring.read();
        ring.owner(ring.reduce(self.hasher.hash(key.as_bytes())))
    }

    /// Add a node and pull into it the keys it now owns.
    pub fn add_node(&self) -> Result<NodeId> {
        let mut ring = self.ring.write();
        let id = ring.add_node()?;
        if let Some(migration) = Rebalancer::new(self.hasher.as_ref()).on_add(&ring, id)? {
            info!(node = %id, from = %migration.from, moved = migration.moved, "node joined");
        }
        Ok(id)
    }

    /// Remove a node, handing its keys to the next node clockwise.
    ///
    /// Removing the only node discards whatever it still stores; the
    /// returned [`Migration`] then has no target and counts the discarded
    /// keys in `dropped`.
    pub fn remove_node(&self, id: NodeId) -> Result<Migration> {
        let mut ring = self.ring.write();
        if !ring.contains(id) {
            return Err(Error::NodeNotFound(id));
        }
        let migration = Rebalancer::new(self.hasher.as_ref()).on_remove(&ring, id)?;
        ring.remove_node(id)?;
        info!(
            node = %id,
            to = ?migration.to,
            moved = migration.moved,
            dropped = migration.dropped,
            "node left"
        );
        Ok(migration)
    }

    /// Snapshot of all nodes in ring order.
    pub fn nodes(&self) -> Vec<NodeInfo> {
        self.ring.read().nodes().map(|node| node.info()).collect()
    }

    /// Keys stored on the given node.
    pub fn node_keys(&self, id: NodeId) -> Result<Vec<String>> {
        self.ring
            .read()
            .get(id)
            .map(|node| node.keys())
            .ok_or(Error::NodeNotFound(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.ring.read().contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.ring.read().node_count()
    }

    /// Total number of keys across all nodes.
    pub fn len(&self) -> usize {
        self.ring.read().nodes().map(|node| node.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ring_size(&self) -> u64 {
        self.ring.read().ring_size()
    }

    pub fn hash_name(&self) -> &'static str {
        self.hasher.name()
    }
}

impl fmt::Debug for Partitioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partitioner")
            .field("hash", &self.hasher.name())
            .field("nodes", &self.nodes())
            .finish()
    }
}

/// Builder for [`Partitioner`].
///
/// Configuration supplies the ring size and the stock hash function; a
/// custom hash function or position source overrides the configured one.
pub struct PartitionerBuilder {
    config: RingConfig,
    hasher: Option<Box<dyn HashFunction>>,
    positions: Option<Box<dyn PositionSource>>,
}

impl PartitionerBuilder {
    pub fn new(config: RingConfig) -> Self {
        Self {
            config,
            hasher: None,
            positions: None,
        }
    }

    /// Use a custom hash function instead of `config.hash`.
    pub fn with_hash_function(mut self, hasher: impl HashFunction) -> Self {
        self.hasher = Some(Box::new(hasher));
        self
    }

    /// Use a custom position source instead of the seeded default.
    pub fn with_position_source(mut self, positions: impl PositionSource + 'static) -> Self {
        self.positions = Some(Box::new(positions));
        self
    }

    pub fn build(self) -> Result<Partitioner> {
        let config = self.config;
        config.validate()?;

        let hasher = self.hasher.unwrap_or_else(|| config.hash.build());
        let positions: Box<dyn PositionSource> = match self.positions {
            Some(positions) => positions,
            None => Box::new(match config.seed {
                Some(seed) => SeededPositions::new(seed),
                None => SeededPositions::from_entropy(),
            }),
        };

        let mut ring = HashRing::with_config(&config, positions)?;
        for _ in 0..config.initial_nodes {
            ring.add_node()?;
        }

        info!(
            ring_size = config.ring_size,
            nodes = ring.node_count(),
            hash = hasher.name(),
            "partitioner ready"
        );
        Ok(Partitioner {
            ring: RwLock::new(ring),
            hasher,
        })
    }
}
