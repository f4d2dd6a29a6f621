//! # Least Recently Used (LRU) Engine
//!
//! A single circular doubly linked list plus a hash index. Every access moves
//! the entry next to the sentinel on the front side; the entry at
//! `sentinel.prev` is the least recently used and is evicted when a new key
//! would overflow the capacity.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         LruCache<K, V>                               │
//!   │                                                                      │
//!   │   parking_lot::Mutex<LruCore<K, V>>                                  │
//!   │        │                                                             │
//!   │        ▼                                                             │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  index: FxHashMap<K, SlotId>                                 │   │
//!   │   │     key_1 ─────────────┐  key_2 ─────────┐  key_3 ─────┐     │   │
//!   │   │                        ▼                 ▼             ▼     │   │
//!   │   │  nodes: ListArena ┌────────┐      ┌────────┐      ┌────────┐ │   │
//!   │   │    [sentinel] ──► │ key_1  │ ───► │ key_2  │ ───► │ key_3  │ │   │
//!   │   │         ▲         └────────┘      └────────┘      └───┬────┘ │   │
//!   │   │         └─────────────────────────────────────────────┘      │   │
//!   │   │        MRU ─────────────────────────────────────► LRU        │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method        | Complexity | Description                                |
//! |---------------|------------|--------------------------------------------|
//! | `put(k, v)`   | O(1)       | Insert or overwrite, may evict the LRU     |
//! | `get(&k)`     | O(1)       | Lookup + move to MRU                       |
//! | `peek(&k)`    | O(1)       | Lookup without reordering                  |
//! | `remove(&k)`  | O(1)       | Unlink + erase from the index              |
//! | `pop_lru()`   | O(1)       | Remove the entry at `sentinel.prev`        |
//!
//! ## Thread Safety
//!
//! - `LruCore`: single-threaded, `&mut self` API
//! - `LruCache`: one `parking_lot::Mutex` held for the full duration of every
//!   call. A `Mutex` rather than an `RwLock` because `get` reorders the list.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru::LruCache;
//! use evictkit::traits::CoreCache;
//!
//! let cache = LruCache::new(2);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! cache.get(&1);
//! cache.put(3, "c");
//!
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&1), Some("a"));
//! assert_eq!(cache.get(&3), Some("c"));
//! ```

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::intrusive_list::{ListArena, ListId, SlotId};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{ConcurrentCache, CoreCache, MutableCache};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded LRU core: hash index + one sentinel-anchored ring.
pub struct LruCore<K, V> {
    nodes: ListArena<Entry<K, V>>,
    order: ListId,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core holding at most `capacity` entries.
    ///
    /// A capacity of 0 creates a cache that accepts no items.
    pub fn new(capacity: usize) -> Self {
        let mut nodes = ListArena::with_capacity(capacity);
        let order = nodes.new_list();
        Self {
            nodes,
            order,
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Inserts or overwrites `key`, returning the previous value.
    ///
    /// An existing key is promoted to MRU before its value is replaced. A new
    /// key evicts the LRU entry first when the core is full.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            self.nodes.move_to_front(self.order, id);
            let entry = self.nodes.get_mut(id)?;
            return Some(std::mem::replace(&mut entry.value, value));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.index.len() >= self.capacity {
            self.evict_lru();
        }
        let id = self.nodes.push_front(
            self.order,
            Entry {
                key: key.clone(),
                value,
            },
        );
        self.index.insert(key, id);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        None
    }

    /// Overwrites `key` only if it is resident.
    ///
    /// Returns the previous value on success, or gives `value` back as
    /// `Err` when the key is absent (nothing is inserted).
    pub fn update(&mut self, key: &K, value: V) -> Result<V, V> {
        match self.index.get(key) {
            Some(&id) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_update();

                self.nodes.move_to_front(self.order, id);
                match self.nodes.get_mut(id) {
                    Some(entry) => Ok(std::mem::replace(&mut entry.value, value)),
                    None => Err(value),
                }
            },
            None => Err(value),
        }
    }

    /// Returns the value for `key`, inserting `default()` if absent.
    ///
    /// Either way the entry ends up at the MRU position. Returns `None` only
    /// for a zero-capacity core.
    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> Option<&mut V> {
        let id = match self.index.get(&key) {
            Some(&id) => {
                self.nodes.move_to_front(self.order, id);
                id
            },
            None => {
                if self.capacity == 0 {
                    return None;
                }

                #[cfg(feature = "metrics")]
                self.metrics.record_insert_new();

                if self.index.len() >= self.capacity {
                    self.evict_lru();
                }
                let id = self.nodes.push_front(
                    self.order,
                    Entry {
                        key: key.clone(),
                        value: default(),
                    },
                );
                self.index.insert(key, id);
                id
            },
        };
        self.nodes.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Looks up `key` and moves it to the MRU position.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            },
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.nodes.move_to_front(self.order, id);
        self.nodes.get(id).map(|entry| &entry.value)
    }

    /// Looks up `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Removes `key` if resident.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.nodes.remove(id).map(|entry| entry.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let id = self.nodes.back(self.order)?;
        let entry = self.nodes.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// The entry that the next overflowing insert would evict.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let id = self.nodes.back(self.order)?;
        self.nodes.get(id).map(|entry| (&entry.key, &entry.value))
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.nodes
            .iter(self.order)
            .map(|(_, entry)| (&entry.key, &entry.value))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.nodes.clear();
        self.order = self.nodes.new_list();
        self.index.clear();
    }

    /// Verifies that the index and the recency ring describe the same set.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let linked = self.nodes.check_list(self.order)?;
        if linked != self.index.len() || self.nodes.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "lru index has {} keys but the ring links {linked} nodes",
                self.index.len()
            )));
        }
        for (id, entry) in self.nodes.iter(self.order) {
            if self.index.get(&entry.key) != Some(&id) {
                return Err(InvariantError::new(format!(
                    "lru node {} is not indexed under its key",
                    id.index()
                )));
            }
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "lru holds {} entries over capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        Ok(())
    }

    fn evict_lru(&mut self) {
        if self.pop_lru().is_some() {
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();

            trace!(capacity = self.capacity, "lru evicted least recently used entry");
        }
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert_eq!(self.nodes.len(), self.index.len());
        debug_assert!(self.index.len() <= self.capacity);
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot::capture(&self.metrics, self.index.len(), self.capacity)
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

/// Thread-safe LRU engine: an [`LruCore`] behind one `parking_lot::Mutex`.
pub struct LruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 creates a cache that accepts no items.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::lru::LruCache;
    /// use evictkit::traits::CoreCache;
    ///
    /// let cache = LruCache::new(2);
    /// cache.put("a", 1);
    /// cache.put("b", 2);
    /// cache.put("c", 3);
    ///
    /// assert!(!cache.contains(&"a"));
    /// assert_eq!(cache.recency_order(), vec!["c", "b"]);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::new(capacity)),
        }
    }

    /// Number of resident entries.
    ///
    /// Unlike [`CoreCache::len`] this needs no `V: Clone`.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().put(key, value)
    }

    /// Overwrites `key` only if resident; see [`LruCore::update`].
    pub fn update(&self, key: &K, value: V) -> Result<V, V> {
        self.inner.lock().update(key, value)
    }

    /// Applies `f` to the value for `key`, inserting `default()` first if
    /// absent, all under one lock acquisition. Returns `None` only for a
    /// zero-capacity cache.
    pub fn update_or_insert_with<R>(
        &self,
        key: K,
        default: impl FnOnce() -> V,
        f: impl FnOnce(&mut V) -> R,
    ) -> Option<R> {
        let mut core = self.inner.lock();
        core.get_or_insert_with(key, default).map(f)
    }

    /// Keys from most to least recently used.
    pub fn recency_order(&self) -> Vec<K> {
        self.inner.lock().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    /// Verifies the index and the recency ring under one lock acquisition.
    ///
    /// See [`LruCore::check_invariants`].
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Looks up `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }
}

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }
}

impl<K: Send, V: Send> ConcurrentCache for LruCache<K, V> {}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
