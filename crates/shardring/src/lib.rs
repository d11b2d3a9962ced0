//! Consistent hashing partitioner for in-memory key-value shards.
//!
//! This crate provides the pieces of a position-ring partitioner:
//! - Hash functions that place keys on a bounded ring
//! - Position sources that place nodes on the ring
//! - Nodes holding one shard of key-value data each
//! - The hash ring and its ownership rule
//! - The rebalancer that moves the minimal set of keys on membership change
//! - The `Partitioner` facade tying them together behind one lock

pub mod config;
pub mod error;
pub mod hash;
pub mod node;
pub mod partitioner;
pub mod position;
pub mod rebalance;
pub mod ring;

pub use config::RingConfig;
pub use error::{Error, Result};
pub use hash::{HashAlgorithm, HashFunction};
pub use node::{Node, NodeId, NodeInfo};
pub use partitioner::{Partitioner, PartitionerBuilder};
pub use position::{HashedPositions, Position, PositionSource, ScriptedPositions, SeededPositions};
pub use rebalance::{Migration, Rebalancer};
pub use ring::HashRing;
