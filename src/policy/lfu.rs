//! # LFU (Least Frequently Used) Engine
//!
//! O(1) LFU built on [`FrequencyBuckets`]: every resident key sits in the
//! bucket of its access count, and `min_freq` points at the bucket the next
//! victim comes from.
//!
//! ## Eviction Flow
//!
//! ```text
//!   put(key, value)
//!        │
//!        ▼
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │ Key already resident?                                              │
//!   │   YES → promote (freq + 1, front of new bucket), overwrite value   │
//!   │   NO  → continue                                                   │
//!   └────────────────────────────────────────────────────────────────────┘
//!        │
//!        ▼
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │ At capacity?                                                       │
//!   │   YES → evict back of bucket[min_freq] (least recently promoted    │
//!   │         among the least frequent)                                  │
//!   └────────────────────────────────────────────────────────────────────┘
//!        │
//!        ▼
//!   insert at freq 1, min_freq = 1
//! ```
//!
//! ## LFU vs LRU
//!
//! ```text
//!   Access pattern: A, B, A, C, A, D    capacity 2
//!
//!   LRU: [D, A]   A survives only because it was touched last
//!   LFU: {A:3, D:1}   A survives because it is hot; C was evicted at freq 1
//! ```
//!
//! ## Thread Safety
//!
//! [`LfuCore`] is single-threaded. [`LfuCache`] wraps it in one
//! `parking_lot::Mutex`; `get` promotes, so reads take the lock exclusively.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lfu::LfuCache;
//! use evictkit::traits::CoreCache;
//!
//! let cache = LfuCache::new(2);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! cache.get(&1);
//! cache.put(3, "c");
//!
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.frequency(&1), Some(2));
//! ```

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::trace;

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{ConcurrentCache, CoreCache};

/// Single-threaded O(1) LFU core.
pub struct LfuCore<K, V> {
    freq: FrequencyBuckets<K, V>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core holding at most `capacity` entries; 0 stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            freq: FrequencyBuckets::new(capacity),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Looks up `key`, bumping its frequency on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(id) = self.freq.touch(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.freq.value(id)
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(id) = self.freq.touch(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let slot = self.freq.value_mut(id)?;
            return Some(std::mem::replace(slot, value));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.freq.len() >= self.capacity
            && let Some((_, _, victim_freq)) = self.freq.evict_min()
        {
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();

            trace!(victim_freq, capacity = self.capacity, "lfu evicted least frequent entry");
        }
        self.freq.insert_new(key, value);
        None
    }

    /// Value of `key` without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.freq.peek(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.freq.contains(key)
    }

    /// Access count of `key`, without counting an access.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.freq.frequency(key)
    }

    /// Frequency of the bucket the next victim comes from; 0 when empty.
    pub fn min_frequency(&self) -> u64 {
        self.freq.min_freq()
    }

    /// Iterates `(key, value, frequency)` in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V, u64)> {
        self.freq.iter()
    }

    pub fn len(&self) -> usize {
        self.freq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry and bucket.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.freq.clear();
    }

    /// Verifies bucket membership, `min_freq` and the frequency total.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.freq.check_invariants()?;
        if self.freq.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "lfu holds {} entries over capacity {}",
                self.freq.len(),
                self.capacity
            )));
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot::capture(&self.metrics, self.freq.len(), self.capacity)
    }
}

impl<K, V> fmt::Debug for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.min_frequency())
            .finish_non_exhaustive()
    }
}

/// Thread-safe LFU engine.
pub struct LfuCache<K, V> {
    inner: Mutex<LfuCore<K, V>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU cache holding at most `capacity` entries.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::lfu::LfuCache;
    /// use evictkit::traits::CoreCache;
    ///
    /// let cache = LfuCache::new(2);
    /// cache.put("a", 1);
    /// cache.put("b", 2);
    /// cache.get(&"a");
    /// cache.put("c", 3); // "b" has the lowest frequency
    ///
    /// assert!(!cache.contains(&"b"));
    /// assert_eq!(cache.frequency(&"a"), Some(2));
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LfuCore::new(capacity)),
        }
    }

    /// Use count of `key`; does not count as an access.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    pub fn min_frequency(&self) -> u64 {
        self.inner.lock().min_frequency()
    }

    /// See [`LfuCore::check_invariants`].
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }
}

impl<K, V> CoreCache<K, V> for LfuCache<K, V>
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

impl<K: Send, V: Send> ConcurrentCache for LfuCache<K, V> {}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LfuCache").field(&*self.inner.lock()).finish()
    }
}
