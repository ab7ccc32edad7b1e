//! # CoreKV - Memtable and Filter Primitives for an LSM-Tree Engine
//!
//! CoreKV provides the two in-memory building blocks of a log-structured
//! key-value storage engine:
//!
//! - **SkipList / MemTable**: the ordered, concurrently accessed write buffer
//! - **Bloom Filter**: a compact membership filter that lets reads skip
//!   immutable segments that cannot contain a key
//!
//! Both share the 32-bit hash in [`hash`], so a filter built at flush time
//! answers identically when it is queried later.
//!
//! ## Example Usage
//!
//! ```rust
//! use corekv::memtable::MemTable;
//! use corekv::Options;
//!
//! # fn main() -> Result<(), corekv::Error> {
//! let memtable = MemTable::new(Options::default())?;
//!
//! memtable.put(b"key1", b"value1")?;
//! memtable.put(b"key2", b"value2")?;
//!
//! if let Some(entry) = memtable.get(b"key1") {
//!     println!("Found: {:?}", entry.value());
//! }
//!
//! // Filter for the segment this memtable would be flushed into
//! let filter = memtable.build_filter();
//! assert!(filter.may_contain_key(b"key2"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod error;
pub mod filter;
pub mod hash;
pub mod memtable;

// Re-exports
pub use config::Options;
pub use error::{Error, Result};
pub use filter::{bloom_bits_per_key, BloomFilter, Filter};
pub use memtable::{Entry, MemTable, SkipList};
