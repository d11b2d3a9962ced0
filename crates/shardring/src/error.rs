//! Error types for the ring.

use crate::node::NodeId;
use thiserror::Error;

/// Result type alias for ring operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while routing keys or changing ring membership.
///
/// An absent key is not an error: lookups return `Ok(None)` so callers can
/// tell "key absent" from "no node exists".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No nodes exist to own a key.
    #[error("ring has no nodes")]
    EmptyRing,

    /// Removal or lookup by an id that is not a live node.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Every position of the ring space is occupied.
    #[error("ring is full: all {ring_size} positions are occupied")]
    RingFull { ring_size: u64 },

    /// Rejected configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
