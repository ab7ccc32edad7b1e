//! # MemTable - In-Memory Sorted Table
//!
//! The MemTable is an in-memory data structure that stores recent writes.
//! It uses a [`SkipList`] for ordered, concurrent reads and writes.
//!
//! ## Design
//!
//! - Backed by a skiplist guarded by a single reader/writer lock
//! - Writing an existing key replaces its value in place
//! - Tracks size to determine when to flush to disk
//! - Builds the bloom filter for the table it will be flushed into
//!
//! ## Thread Safety
//!
//! MemTable can be shared across threads with `Arc<MemTable>`. Writers are
//! serialized against each other and against readers; readers run together.

mod entry;
mod skiplist;

pub use entry::{Entry, ENTRY_OVERHEAD, VALUE_POINTER_SIZE};
pub use skiplist::{Iter, SkipList, MAX_LEVEL};

use crate::config::Options;
use crate::error::{Error, Result};
use crate::filter::{bloom_bits_per_key, BloomFilter};
use crate::hash::hash;

/// MemTable stores recent writes in memory using a SkipList.
///
/// # Example
///
/// ```rust
/// use corekv::memtable::MemTable;
/// use corekv::Options;
///
/// # fn main() -> Result<(), corekv::Error> {
/// let memtable = MemTable::new(Options::default())?;
/// memtable.put(b"key1", b"value1")?;
/// assert_eq!(memtable.get(b"key1").unwrap().value(), b"value1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemTable {
    /// The underlying SkipList storing key -> Entry
    list: SkipList,

    /// Flush threshold and filter tuning
    options: Options,
}

impl MemTable {
    /// Creates a new empty MemTable.
    ///
    /// # Errors
    ///
    /// Returns an error if `options` fail validation.
    pub fn new(options: Options) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            list: SkipList::new(),
            options,
        })
    }

    /// Inserts a key-value pair, replacing any previous value for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.insert(Entry::new(key, value))
    }

    /// Inserts a prepared entry, replacing any previous entry for its key.
    pub fn insert(&self, entry: Entry) -> Result<()> {
        if entry.key().is_empty() {
            return Err(Error::invalid_argument("key must not be empty"));
        }

        let was_full = self.should_flush();
        self.list.add(entry)?;

        if !was_full && self.should_flush() {
            log::info!(
                "MemTable reached flush threshold: {} bytes >= {} bytes ({} entries)",
                self.approximate_size(),
                self.options.memtable_size,
                self.len()
            );
        }
        Ok(())
    }

    /// Retrieves the entry for a key, or `None` if the key was never written.
    pub fn get(&self, key: &[u8]) -> Option<Entry> {
        self.list.search(key)
    }

    /// Returns the approximate size of the MemTable in bytes.
    pub fn approximate_size(&self) -> usize {
        self.list.size()
    }

    /// Returns `true` once the MemTable has grown to its flush threshold.
    pub fn should_flush(&self) -> bool {
        self.approximate_size() >= self.options.memtable_size
    }

    /// Estimates the size of the table this MemTable would flush to, with
    /// large values moved out of line.
    pub fn estimated_table_size(&self) -> usize {
        let threshold = self.options.value_threshold;
        self.list.iter().map(|entry| entry.estimate_size(threshold)).sum()
    }

    /// Builds a bloom filter over every key in the MemTable, sized for the
    /// configured false positive rate.
    pub fn build_filter(&self) -> BloomFilter {
        let hashes: Vec<u32> = self.list.iter().map(|entry| hash(entry.key())).collect();
        let bits_per_key =
            bloom_bits_per_key(hashes.len(), self.options.bloom_false_positive_rate);
        BloomFilter::new(&hashes, bits_per_key)
    }

    /// Returns the number of entries in the MemTable.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the MemTable contains no entries.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns an iterator over the MemTable entries in key order.
    ///
    /// Writes block until the iterator is dropped.
    pub fn iter(&self) -> Iter<'_> {
        self.list.iter()
    }

    /// Returns the options this MemTable was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }
}
