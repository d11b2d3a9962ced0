//! Consistent hash ring implementation.
//!
//! The ring keeps live nodes ordered by position and provides logarithmic
//! lookup of the node responsible for a hashed key.

pub mod ring;

pub use ring::HashRing;
