//! # Entry
//!
//! The record stored by the skiplist: a key, a value and the small amount of
//! metadata the wider engine attaches to every write.
//!
//! Keys and values are held as [`Bytes`] so a lookup can hand back its own
//! copy of a record without duplicating the payload.

use bytes::Bytes;

/// Bytes of metadata accounted per entry: `meta` (1) + `expires_at` (8).
pub const ENTRY_OVERHEAD: usize = 9;

/// Encoded size of a value pointer into a value log.
pub const VALUE_POINTER_SIZE: usize = 12;

/// A key-value record with metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: Bytes,
    value: Bytes,
    meta: u8,
    expires_at: u64,
}

impl Entry {
    /// Creates a new entry with no metadata and no expiry.
    ///
    /// # Example
    ///
    /// ```rust
    /// use corekv::memtable::Entry;
    ///
    /// let entry = Entry::new(b"key", b"value");
    /// assert_eq!(entry.key(), b"key");
    /// ```
    pub fn new(key: &[u8], value: &[u8]) -> Self {
        Self {
            key: Bytes::copy_from_slice(key),
            value: Bytes::copy_from_slice(value),
            meta: 0,
            expires_at: 0,
        }
    }

    /// Sets the metadata byte.
    pub fn with_meta(mut self, meta: u8) -> Self {
        self.meta = meta;
        self
    }

    /// Sets the expiry time in seconds since the Unix epoch. Zero means never.
    pub fn with_expires_at(mut self, expires_at: u64) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Returns the key.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Returns the value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the metadata byte.
    pub fn meta(&self) -> u8 {
        self.meta
    }

    /// Returns the expiry time, or 0 if the entry never expires.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Returns `true` if the entry has an expiry at or before `now_secs`.
    pub fn is_expired(&self, now_secs: u64) -> bool {
        self.expires_at != 0 && self.expires_at <= now_secs
    }

    /// Returns the in-memory size charged to a MemTable for this entry.
    pub fn size(&self) -> usize {
        self.key.len() + self.value.len() + ENTRY_OVERHEAD
    }

    /// Estimates the size of this entry once written to a table.
    ///
    /// Values of at least `value_threshold` bytes are stored out of line and
    /// only a value pointer is counted for them.
    pub fn estimate_size(&self, value_threshold: usize) -> usize {
        if self.value.len() < value_threshold {
            self.key.len() + self.value.len() + 1
        } else {
            self.key.len() + VALUE_POINTER_SIZE + 1
        }
    }
}
