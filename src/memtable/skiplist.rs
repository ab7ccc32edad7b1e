//! # SkipList - Ordered Index Behind the MemTable
//!
//! A probabilistically balanced ordered map from byte keys to [`Entry`]
//! records, shared between threads behind a single reader/writer lock.
//!
//! ## Layout
//!
//! Nodes live in an arena (`Vec<Node>`) and link to each other by index.
//! Index 0 is the header: it holds an empty entry, has `MAX_LEVEL` links and
//! is never a link target, so links are stored as `Option<NonZeroU32>`.
//!
//! ```text
//! Level 2:  HEAD ───────────► [2] ─────────────────► NIL
//! Level 1:  HEAD ───► [1] ──► [2] ─────────► [3] ──► NIL
//! Level 0:  HEAD ───► [1] ──► [2] ──► [4] ─► [3] ──► NIL
//! ```
//!
//! ## Ordering
//!
//! Nodes are ordered by `(score, key)`. The score packs the first 8 key bytes
//! big-endian into a `u64` and widens it to `f64`; it never contradicts the
//! byte order of keys, so the full key comparison only runs on score ties.
//!
//! ## Thread Safety
//!
//! [`SkipList::add`] takes the write lock for the whole splice. Lookups and
//! iteration take the read lock, so they never observe a half-linked node.

use crate::error::{Error, Result};
use crate::memtable::Entry;
use parking_lot::{RwLock, RwLockReadGuard};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::atomic::{self, AtomicUsize};

/// Maximum number of levels any node can participate in.
pub const MAX_LEVEL: usize = 48;

/// Arena index of the header node.
const HEAD: usize = 0;

type Link = Option<NonZeroU32>;

struct Node {
    entry: Entry,
    score: f64,
    /// One forward link per level this node participates in.
    next: Box<[Link]>,
}

impl Node {
    fn new(entry: Entry, score: f64, next: Box<[Link]>) -> Self {
        Self { entry, score, next }
    }
}

struct Inner {
    nodes: Vec<Node>,
    /// Tallest level in use by any node (at least 1).
    height: usize,
    rng: SmallRng,
}

impl Inner {
    fn new(rng: SmallRng) -> Self {
        let header = Node::new(
            Entry::new(b"", b""),
            0.0,
            vec![None; MAX_LEVEL].into_boxed_slice(),
        );
        Self {
            nodes: vec![header],
            height: 1,
            rng,
        }
    }

    /// Returns the arena index of the node holding `key`.
    fn find(&self, key: &[u8]) -> Option<usize> {
        let score = calc_score(key);
        let mut cur = HEAD;

        for level in (0..self.height).rev() {
            while let Some(next) = self.nodes[cur].next[level] {
                let next = index(next);
                match compare(score, key, &self.nodes[next]) {
                    Ordering::Greater => cur = next,
                    Ordering::Equal => return Some(next),
                    Ordering::Less => break,
                }
            }
        }

        None
    }
}

/// A concurrent ordered map from byte keys to [`Entry`] records.
///
/// # Example
///
/// ```rust
/// use corekv::memtable::{Entry, SkipList};
///
/// let list = SkipList::new();
/// list.add(Entry::new(b"key", b"value")).unwrap();
///
/// let entry = list.search(b"key").unwrap();
/// assert_eq!(entry.value(), b"value");
/// assert!(list.search(b"missing").is_none());
/// ```
pub struct SkipList {
    inner: RwLock<Inner>,

    /// Sum of `Entry::size()` over live entries. Only written under the
    /// write lock.
    size: AtomicUsize,
}

impl SkipList {
    /// Creates an empty skiplist with a level generator seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Creates an empty skiplist whose level draws are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            inner: RwLock::new(Inner::new(rng)),
            size: AtomicUsize::new(0),
        }
    }

    /// Inserts `entry`, or replaces the entry stored under the same key.
    ///
    /// A replacement keeps the existing node and only swaps its record; the
    /// size counter moves by the difference between the two records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Capacity`] if the arena cannot index another node.
    pub fn add(&self, entry: Entry) -> Result<()> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let level = random_level(&mut inner.rng, MAX_LEVEL);
        let score = calc_score(entry.key());

        // Walk from the top of the header, not from the current height, so
        // every level below `level` has a recorded predecessor.
        let mut prev = [HEAD; MAX_LEVEL];
        let mut cur = HEAD;
        for i in (0..MAX_LEVEL).rev() {
            while let Some(next) = inner.nodes[cur].next[i] {
                let next = index(next);
                match compare(score, entry.key(), &inner.nodes[next]) {
                    Ordering::Greater => cur = next,
                    Ordering::Equal => {
                        let new_size = entry.size();
                        let old = std::mem::replace(&mut inner.nodes[next].entry, entry);
                        self.adjust_size(old.size(), new_size);
                        return Ok(());
                    }
                    Ordering::Less => break,
                }
            }
            prev[i] = cur;
        }

        let id = u32::try_from(inner.nodes.len())
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| Error::capacity("skiplist arena is full"))?;

        let next: Box<[Link]> = prev[..level]
            .iter()
            .enumerate()
            .map(|(i, &p)| inner.nodes[p].next[i])
            .collect();
        let entry_size = entry.size();
        inner.nodes.push(Node::new(entry, score, next));
        for (i, &p) in prev[..level].iter().enumerate() {
            inner.nodes[p].next[i] = Some(id);
        }

        if level > inner.height {
            log::trace!("SkipList height grew from {} to {}", inner.height, level);
            inner.height = level;
        }
        self.size.fetch_add(entry_size, atomic::Ordering::Relaxed);

        Ok(())
    }

    /// Returns a copy of the entry stored under `key`, if any.
    pub fn search(&self, key: &[u8]) -> Option<Entry> {
        let inner = self.inner.read();
        inner.find(key).map(|idx| inner.nodes[idx].entry.clone())
    }

    /// Returns `true` if an entry is stored under `key`.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.inner.read().find(key).is_some()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().nodes.len() - 1
    }

    /// Returns `true` if the skiplist holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the tallest level currently in use.
    pub fn height(&self) -> usize {
        self.inner.read().height
    }

    /// Returns the total size of all stored entries in bytes.
    pub fn size(&self) -> usize {
        self.size.load(atomic::Ordering::Relaxed)
    }

    /// Returns an iterator over the entries in key order.
    ///
    /// The iterator holds the read lock until it is dropped, so writers on
    /// other threads wait for it and calling [`SkipList::add`] from the same
    /// thread while it is alive deadlocks.
    pub fn iter(&self) -> Iter<'_> {
        let inner = self.inner.read();
        let cursor = inner.nodes[HEAD].next[0];
        Iter { inner, cursor }
    }

    fn adjust_size(&self, old: usize, new: usize) {
        if new >= old {
            self.size.fetch_add(new - old, atomic::Ordering::Relaxed);
        } else {
            self.size.fetch_sub(old - new, atomic::Ordering::Relaxed);
        }
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SkipList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("SkipList")
            .field("len", &(inner.nodes.len() - 1))
            .field("height", &inner.height)
            .field("size", &self.size())
            .finish()
    }
}

/// Iterator over SkipList entries in key order.
pub struct Iter<'a> {
    inner: RwLockReadGuard<'a, Inner>,
    cursor: Link,
}

impl Iterator for Iter<'_> {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.inner.nodes[index(self.cursor?)];
        self.cursor = node.next[0];
        Some(node.entry.clone())
    }
}

fn index(link: NonZeroU32) -> usize {
    link.get() as usize
}

/// Packs up to the first 8 bytes of `key` big-endian, zero filled.
fn calc_score(key: &[u8]) -> f64 {
    let mut packed = [0u8; 8];
    let len = key.len().min(packed.len());
    packed[..len].copy_from_slice(&key[..len]);
    u64::from_be_bytes(packed) as f64
}

/// Orders `(score, key)` against `node`.
fn compare(score: f64, key: &[u8], node: &Node) -> Ordering {
    score.total_cmp(&node.score).then_with(|| key.cmp(node.entry.key()))
}

/// Draws a level in `1..=max_level`: level `i` with probability `2^-i`,
/// with the remaining mass on `max_level`.
fn random_level<R: Rng + ?Sized>(rng: &mut R, max_level: usize) -> usize {
    let mut level = 1;
    while level < max_level && !rng.random_bool(0.5) {
        level += 1;
    }
    level
}
