//! Hash functions for placing keys on the ring.
//!
//! The ring depends only on the [`HashFunction`] trait; the implementations
//! here are stock choices selectable through configuration.

pub mod polynomial;
pub mod sip;
pub mod traits;
pub mod xxh3;

pub use polynomial::PolynomialHash;
pub use sip::SipHashFunction;
pub use traits::HashFunction;
pub use xxh3::Xxh3HashFunction;

use serde::{Deserialize, Serialize};

/// Hash functions that can be selected by name in a [`RingConfig`].
///
/// [`RingConfig`]: crate::config::RingConfig
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Sip,
    Xxh3,
    /// Polynomial rolling hash with base 31.
    Hash31,
    /// Polynomial rolling hash with base 17.
    Hash17,
}

impl HashAlgorithm {
    /// Instantiates the selected hash function.
    pub fn build(self) -> Box<dyn HashFunction> {
        match self {
            HashAlgorithm::Sip => Box::new(SipHashFunction::new()),
            HashAlgorithm::Xxh3 => Box::new(Xxh3HashFunction::new()),
            HashAlgorithm::Hash31 => Box::new(PolynomialHash::base31()),
            HashAlgorithm::Hash17 => Box::new(PolynomialHash::base17()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polynomial_hash_values() {
        let h31 = PolynomialHash::base31();
        assert_eq!(h31.hash(b""), 0);
        assert_eq!(h31.hash(b"cat"), 98262); // ((99 * 31) + 97) * 31 + 116

        let h17 = PolynomialHash::base17();
        assert_eq!(h17.hash(b"ab"), 97 * 17 + 98);
    }

    #[test]
    fn test_polynomial_hash_stays_below_modulus() {
        let h31 = PolynomialHash::base31();
        let long = "z".repeat(500);
        assert!(h31.hash(long.as_bytes()) < polynomial::MODULUS);
    }

    #[test]
    fn test_polynomial_hash_counts_utf16_units() {
        // U+00E9 is one UTF-16 unit (233) but two UTF-8 bytes.
        let h31 = PolynomialHash::base31();
        assert_eq!(h31.hash("é".as_bytes()), 233);
    }

    #[test]
    fn test_xxh3_known_value() {
        assert_eq!(Xxh3HashFunction::new().hash(b""), 0x2D06_8005_38D3_94C2);
        assert_ne!(
            Xxh3HashFunction::with_seed(1).hash(b"key"),
            Xxh3HashFunction::new().hash(b"key")
        );
    }

    #[test]
    fn test_sip_deterministic() {
        let sip = SipHashFunction::new();
        assert_eq!(sip.hash(b"key"), sip.hash(b"key"));
        assert_ne!(sip.hash(b"key"), sip.hash(b"other"));
        assert_ne!(
            SipHashFunction::with_keys(1, 2).hash(b"key"),
            sip.hash(b"key")
        );
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(HashAlgorithm::Sip.build().name(), "SipHash13");
        assert_eq!(HashAlgorithm::Xxh3.build().name(), "Xxh3");
        assert_eq!(HashAlgorithm::Hash31.build().name(), "Polynomial");
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sip);
    }
}
