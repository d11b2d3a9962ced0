//! SipHash-1-3 hash function.

use crate::hash::traits::HashFunction;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// SipHash-1-3 with fixed keys, so output is stable across processes.
#[derive(Clone, Debug, Default)]
pub struct SipHashFunction {
    key0: u64,
    key1: u64,
}

impl SipHashFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a hash function keyed with the given 128-bit key.
    pub fn with_keys(key0: u64, key1: u64) -> Self {
        Self { key0, key1 }
    }
}

impl HashFunction for SipHashFunction {
    fn hash(&self, key: &[u8]) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(self.key0, self.key1);
        hasher.write(key);
        hasher.finish()
    }

    fn name(&self) -> &'static str {
        "SipHash13"
    }
}
