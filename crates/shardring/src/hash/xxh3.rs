//! XXH3 hash function.

use crate::hash::traits::HashFunction;
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// 64-bit XXH3, optionally seeded.
#[derive(Clone, Debug, Default)]
pub struct Xxh3HashFunction {
    seed: Option<u64>,
}

impl Xxh3HashFunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl HashFunction for Xxh3HashFunction {
    fn hash(&self, key: &[u8]) -> u64 {
        match self.seed {
            Some(seed) => xxh3_64_with_seed(key, seed),
            None => xxh3_64(key),
        }
    }

    fn name(&self) -> &'static str {
        "Xxh3"
    }
}
