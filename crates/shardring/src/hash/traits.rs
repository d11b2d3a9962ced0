//! Core hash function trait definitions.

use std::sync::Arc;

/// A hash function turns keys into integers for placement on the ring.
///
/// Implementations must be deterministic: the same key always yields the
/// same value, for the lifetime of the ring. The ring reduces the output
/// modulo its size, so implementations may use the full `u64` range.
///
/// Hash functions are stateless and thread-safe, allowing concurrent
/// lookups without synchronization.
pub trait HashFunction: Send + Sync + 'static {
    /// Hashes a key.
    fn hash(&self, key: &[u8]) -> u64;

    /// Returns the name of this hash function.
    fn name(&self) -> &'static str;
}

impl<H: HashFunction + ?Sized> HashFunction for Box<H> {
    fn hash(&self, key: &[u8]) -> u64 {
        (**self).hash(key)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<H: HashFunction + ?Sized> HashFunction for Arc<H> {
    fn hash(&self, key: &[u8]) -> u64 {
        (**self).hash(key)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
