//! 32-bit Murmur-style hash shared by filter construction and lookup.
//!
//! Input bytes are packed little-endian explicitly, so the output does not
//! depend on the host byte order. Building a filter and querying it must go
//! through this same function or the filter will report false negatives.

const SEED: u32 = 0xbc9f_1d34;
const M: u32 = 0xc6a4_a793;

/// Hashes `data` to a 32-bit value.
///
/// # Example
/// ```
/// use corekv::hash::hash;
///
/// assert_eq!(hash(b"abc"), hash(b"abc"));
/// assert_ne!(hash(b"abc"), hash(b"abd"));
/// ```
pub fn hash(data: &[u8]) -> u32 {
    let mut h = SEED ^ (data.len() as u32).wrapping_mul(M);

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h = h.wrapping_add(word).wrapping_mul(M);
        h ^= h >> 16;
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        for (i, &byte) in tail.iter().enumerate().rev() {
            h = h.wrapping_add(u32::from(byte) << (8 * i));
        }
        h = h.wrapping_mul(M);
        h ^= h >> 24;
    }

    h
}
