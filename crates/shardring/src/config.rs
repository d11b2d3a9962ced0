//! Configuration for the ring.

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};

/// Default ring size.
pub const DEFAULT_RING_SIZE: u64 = 32;

/// Random position draws before falling back to a clockwise probe.
pub const DEFAULT_MAX_POSITION_ATTEMPTS: u32 = 64;

/// Ring configuration.
///
/// Deserializable so it can be embedded in a host application's config
/// file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Size of the ring space. Positions and key hashes are reduced modulo
    /// this value, and it bounds the number of live nodes.
    pub ring_size: u64,

    /// Nodes created when the partitioner is built.
    pub initial_nodes: usize,

    /// Hash function used to place keys.
    pub hash: HashAlgorithm,

    /// Proposals requested from the position source before the ring probes
    /// clockwise for a free slot.
    pub max_position_attempts: u32,

    /// Seed for the default position source. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            ring_size: DEFAULT_RING_SIZE,
            initial_nodes: 0,
            hash: HashAlgorithm::default(),
            max_position_attempts: DEFAULT_MAX_POSITION_ATTEMPTS,
            seed: None,
        }
    }
}

impl RingConfig {
    /// Create a configuration with the given ring size.
    pub fn new(ring_size: u64) -> Self {
        Self {
            ring_size,
            ..Default::default()
        }
    }

    pub fn with_initial_nodes(mut self, count: usize) -> Self {
        self.initial_nodes = count;
        self
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_max_position_attempts(mut self, attempts: u32) -> Self {
        self.max_position_attempts = attempts;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the configuration for values the ring cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.ring_size == 0 {
            return Err(Error::InvalidConfig("ring_size must be at least 1".into()));
        }
        if self.max_position_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max_position_attempts must be at least 1".into(),
            ));
        }
        if self.initial_nodes as u128 > u128::from(self.ring_size) {
            return Err(Error::InvalidConfig(format!(
                "initial_nodes ({}) exceeds ring_size ({})",
                self.initial_nodes, self.ring_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RingConfig::default();
        assert_eq!(config.ring_size, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            RingConfig::new(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            RingConfig::new(8).with_max_position_attempts(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            RingConfig::new(4).with_initial_nodes(5).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(RingConfig::new(4).with_initial_nodes(4).validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: RingConfig =
            serde_json::from_str(r#"{"ring_size": 1024, "hash": "xxh3"}"#).unwrap();
        assert_eq!(config.ring_size, 1024);
        assert_eq!(config.hash, HashAlgorithm::Xxh3);
        assert_eq!(config.initial_nodes, 0);
        assert_eq!(config.max_position_attempts, DEFAULT_MAX_POSITION_ATTEMPTS);
        assert_eq!(config.seed, None);
    }
}
