//! Bloom Filter implementation.
//!
//! A space-efficient probabilistic data structure used to test whether an element
//! is a member of a set. False positive matches are possible, but false negatives are not.
//!
//! ## Format
//!
//! ```text
//! [bit array: m_bytes][k: 1 byte]
//! ```
//!
//! The trailing byte holds the number of probes per key. A value above
//! [`MAX_HASH_COUNT`] marks the filter as unusable and every query reports a
//! possible match.

use crate::filter::Filter;
use crate::hash::hash;
use std::f64::consts::LN_2;

/// Upper bound on probes per key; larger trailing bytes mean "always match".
pub const MAX_HASH_COUNT: u8 = 30;

/// Smallest bit array ever allocated.
const MIN_BITS: usize = 64;

/// Returns the bits per key needed to reach `false_positive_rate` for
/// `num_entries` keys: `ceil((-n * ln(p) / ln(2)^2) / n)`.
///
/// A rate outside `(0, 1)` is pulled to the nearest value inside it, and an
/// entry count of zero is sized as a single entry.
///
/// # Example
/// ```
/// use corekv::filter::bloom_bits_per_key;
///
/// assert_eq!(bloom_bits_per_key(1000, 0.01), 10);
/// ```
pub fn bloom_bits_per_key(num_entries: usize, false_positive_rate: f64) -> usize {
    let p = if false_positive_rate.is_nan() || false_positive_rate <= 0.0 {
        f64::EPSILON
    } else if false_positive_rate >= 1.0 {
        1.0 - f64::EPSILON
    } else {
        false_positive_rate
    };
    let n = num_entries.max(1) as f64;

    let num_bits = -n * p.ln() / LN_2.powi(2);
    (num_bits / n).ceil() as usize
}

/// BloomFilter provides probabilistic set membership testing.
///
/// The filter is immutable once built: construct it from the full key set of
/// a segment and query it afterwards.
///
/// # Example
/// ```
/// use corekv::filter::{bloom_bits_per_key, BloomFilter};
///
/// let keys: Vec<&[u8]> = vec![b"key1", b"key2"];
/// let filter = BloomFilter::from_keys(&keys, bloom_bits_per_key(keys.len(), 0.01));
///
/// assert!(filter.may_contain_key(b"key1"));
/// assert!(filter.may_contain_key(b"key2"));
/// // key3 might return true (false positive) or false
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Bit array followed by the probe count byte.
    data: Vec<u8>,
}

impl BloomFilter {
    /// Builds a filter from precomputed key hashes.
    ///
    /// `bits_per_key` of zero still yields one probe per key, and the bit
    /// array never shrinks below 64 bits.
    pub fn new(hashes: &[u32], bits_per_key: usize) -> Self {
        let num_hashes = ((bits_per_key as f64) * 0.69).round() as u8;
        let num_hashes = num_hashes.clamp(1, MAX_HASH_COUNT);

        let num_bits = bits_per_key.saturating_mul(hashes.len()).max(MIN_BITS);
        let num_bytes = (num_bits + 7) / 8;
        // Byte rounding padding is usable capacity.
        let num_bits = num_bytes * 8;

        let mut data = vec![0u8; num_bytes + 1];
        for &h in hashes {
            for pos in probe_positions(h, num_hashes, num_bits) {
                data[pos / 8] |= 1 << (pos % 8);
            }
        }
        data[num_bytes] = num_hashes;

        log::debug!(
            "Built bloom filter: {} keys, {} bits, {} probes per key",
            hashes.len(),
            num_bits,
            num_hashes
        );

        Self { data }
    }

    /// Builds a filter by hashing every key in `keys`.
    pub fn from_keys<K: AsRef<[u8]>>(keys: &[K], bits_per_key: usize) -> Self {
        let hashes: Vec<u32> = keys.iter().map(|key| hash(key.as_ref())).collect();
        Self::new(&hashes, bits_per_key)
    }

    /// Wraps an encoded filter, e.g. one read back from a segment.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the encoded filter.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the filter and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns whether the key with hash `h` may be in the set.
    pub fn may_contain(&self, h: u32) -> bool {
        if self.data.len() < 2 {
            return false;
        }

        let num_hashes = self.data[self.data.len() - 1];
        if num_hashes > MAX_HASH_COUNT {
            log::trace!(
                "Bloom filter probe count {} out of range, matching all keys",
                num_hashes
            );
            return true;
        }

        let num_bits = self.num_bits();
        probe_positions(h, num_hashes, num_bits)
            .all(|pos| self.data[pos / 8] & (1 << (pos % 8)) != 0)
    }

    /// Hashes `key` and checks it against the filter.
    pub fn may_contain_key(&self, key: &[u8]) -> bool {
        self.may_contain(hash(key))
    }

    /// Returns the number of probes per key stored in the trailing byte.
    ///
    /// Returns 0 for a filter too short to carry one.
    pub fn hash_count(&self) -> u8 {
        if self.data.len() < 2 {
            return 0;
        }
        self.data[self.data.len() - 1]
    }

    /// Get the number of bits in the bit array.
    pub fn num_bits(&self) -> usize {
        self.data.len().saturating_sub(1) * 8
    }

    /// Get the size of the encoded filter in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Calculate the approximate false positive rate for `num_keys` keys.
    ///
    /// This is an estimate based on the theoretical formula:
    /// p = (1 - e^(-kn/m))^k
    /// where k = probes per key, n = num_keys, m = num_bits
    pub fn estimated_false_positive_rate(&self, num_keys: usize) -> f64 {
        let k = self.hash_count();
        if num_keys == 0 || self.num_bits() == 0 {
            return 0.0;
        }
        if k > MAX_HASH_COUNT {
            return 1.0;
        }

        let k = f64::from(k);
        let n = num_keys as f64;
        let m = self.num_bits() as f64;

        (1.0 - (-k * n / m).exp()).powf(k)
    }
}

impl Filter for BloomFilter {
    fn may_contain_key(&self, key: &[u8]) -> bool {
        BloomFilter::may_contain_key(self, key)
    }

    fn encode(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn decode(data: &[u8]) -> Self {
        Self::from_bytes(data.to_vec())
    }
}

/// Double hashing: one base hash and its 15/17-bit rotation as the stride
/// produce `num_hashes` bit positions.
fn probe_positions(h: u32, num_hashes: u8, num_bits: usize) -> impl Iterator<Item = usize> {
    let delta = h.rotate_left(15);
    // Reduce in u64: a decoded bit array may hold 2^32 bits or more.
    let num_bits = num_bits as u64;
    (0..u32::from(num_hashes)).map(move |i| {
        let h = h.wrapping_add(delta.wrapping_mul(i));
        (u64::from(h) % num_bits) as usize
    })
}
