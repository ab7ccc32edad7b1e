//! Filter implementations for efficient key existence checking.
//!
//! Filters are built once from the keys of an immutable segment and let a
//! reader skip the segment when a key is definitely not present.

pub mod bloom;

pub use bloom::{bloom_bits_per_key, BloomFilter};

/// Filter trait for key existence checking
pub trait Filter {
    /// Check if a key may exist (can have false positives)
    fn may_contain_key(&self, key: &[u8]) -> bool;

    /// Get the serialized representation of the filter
    fn encode(&self) -> Vec<u8>;

    /// Rebuild a filter from its serialized representation.
    ///
    /// Malformed input never fails here; queries against it degrade instead.
    fn decode(data: &[u8]) -> Self
    where
        Self: Sized;
}
