//! Polynomial rolling string hash.

use crate::hash::traits::HashFunction;

/// Large prime modulus; `base * MODULUS` still fits comfortably in a `u64`.
pub const MODULUS: u64 = 1_000_000_007;

/// Polynomial rolling hash over UTF-16 code units:
/// `h = (base * h mod M + c) mod M` for each code unit `c`.
///
/// Results are always below [`MODULUS`]. Keys that are not valid UTF-8 are
/// hashed byte by byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolynomialHash {
    base: u64,
}

impl PolynomialHash {
    pub fn new(base: u64) -> Self {
        Self { base: base % MODULUS }
    }

    pub fn base31() -> Self {
        Self::new(31)
    }

    pub fn base17() -> Self {
        Self::new(17)
    }

    #[inline]
    fn step(&self, hash: u64, unit: u64) -> u64 {
        (self.base * hash % MODULUS + unit) % MODULUS
    }
}

impl HashFunction for PolynomialHash {
    fn hash(&self, key: &[u8]) -> u64 {
        match std::str::from_utf8(key) {
            Ok(s) => s
                .encode_utf16()
                .fold(0, |hash, unit| self.step(hash, u64::from(unit))),
            Err(_) => key
                .iter()
                .fold(0, |hash, &byte| self.step(hash, u64::from(byte))),
        }
    }

    fn name(&self) -> &'static str {
        "Polynomial"
    }
}
