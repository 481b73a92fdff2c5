//! Bounded least-recently-used cache.
//!
//! [`LruCache`] is the per-field store for spatial interpolators and
//! resolved time indices. It is a plain `IndexMap` whose insertion order
//! doubles as the recency order: a hit moves the entry to the back, and
//! eviction pops the front.
//!
//! The cache is never invalidated explicitly. Every value it holds is a
//! pure function of its key, so a miss only costs a rebuild and can never
//! change a result.

use indexmap::IndexMap;
use std::hash::Hash;

/// Default capacity for field caches.
///
/// An integrator usually needs the two time slices bracketing the current
/// time and nothing else.
pub const DEFAULT_CAPACITY: usize = 2;

/// Fixed-capacity key/value cache with LRU eviction.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    entries: IndexMap<K, V>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq, V: Clone> LruCache<K, V> {
    /// Create an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get_index_of(key) {
            Some(idx) => {
                self.hits += 1;
                let last = self.entries.len() - 1;
                self.entries.move_index(idx, last);
                self.entries.get_index(last).map(|(_, v)| v.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or replace `key`, evicting the least recently used entry if
    /// the cache is full.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(idx) = self.entries.get_index_of(&key) {
            self.entries.shift_remove_index(idx);
        } else if self.entries.len() == self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    /// Return the cached value for `key`, building and inserting it on miss.
    pub fn get_or_insert_with(&mut self, key: K, build: impl FnOnce() -> V) -> V {
        if let Some(v) = self.get(&key) {
            return v;
        }
        let v = build();
        self.insert(key, v.clone());
        v
    }

    /// Whether `key` is cached. Does not touch recency.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
