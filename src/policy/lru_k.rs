//! # LRU-K Engine
//!
//! Admission-gated LRU. A key only enters the primary store once it has been
//! observed `k` times; until then its access count lives in a separate,
//! bounded history store.
//!
//! ```text
//!            every get/put
//!                 │
//!                 ▼
//!   ┌───────────────────────────┐   count reaches k   ┌──────────────────────┐
//!   │ history: LruCache<K,usize>│ ──────────────────► │ main: LruCache<K, V> │
//!   │  key → observed accesses  │   entry removed,    │  resident values     │
//!   └───────────────────────────┘   value inserted    └──────────────────────┘
//!      evicts per LRU on overflow;                       evicts per LRU on
//!      an evicted count restarts at 0                    overflow
//! ```
//!
//! Both stores are [`LruCache`]s with their own lock. One logical operation
//! takes the history lock, releases it, then takes the primary lock; the two
//! are never held together.
//!
//! `get` bumps the history count on hits and misses alike, so reads count
//! toward admission. A key that is already resident keeps collecting history
//! counts; reaching `k` again simply re-inserts it into the primary store. A
//! zero-capacity engine ignores every access and keeps no history.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru_k::LruKCache;
//! use evictkit::traits::CoreCache;
//!
//! let cache = LruKCache::new(4, 16, 2);
//! cache.put("page", 1);
//! assert_eq!(cache.get(&"page"), None); // gets count but never admit
//!
//! cache.put("page", 2); // 3rd access reaches k
//! assert_eq!(cache.get(&"page"), Some(2));
//! ```

use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::policy::lru::LruCache;
use crate::traits::{ConcurrentCache, CoreCache, MutableCache};

/// LRU-K engine: a primary [`LruCache`] guarded by a history of access counts.
pub struct LruKCache<K, V> {
    main: LruCache<K, V>,
    history: LruCache<K, usize>,
    k: usize,
}

impl<K, V> LruKCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an engine with `capacity` primary slots, `history_capacity`
    /// tracked candidates and admission threshold `k`.
    ///
    /// `k == 0` behaves as `k == 1`; a zero history capacity keeps a single
    /// history slot so counts can still accumulate for the latest key.
    pub fn new(capacity: usize, history_capacity: usize, k: usize) -> Self {
        Self {
            main: LruCache::new(capacity),
            history: LruCache::new(history_capacity.max(1)),
            k: k.max(1),
        }
    }

    /// Bumps the history count for `key` and returns the new count.
    fn record_access(&self, key: &K) -> usize {
        self.history
            .update_or_insert_with(
                key.clone(),
                || 0,
                |count| {
                    *count += 1;
                    *count
                },
            )
            .unwrap_or(1)
    }

    /// Admission threshold.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of keys currently tracked in history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Maximum number of keys tracked in history (at least 1).
    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Observed access count for a key that is still in history.
    pub fn access_count(&self, key: &K) -> Option<usize> {
        self.history.peek(key)
    }

    /// Keys of the primary store from most to least recently used.
    pub fn recency_order(&self) -> Vec<K> {
        self.main.recency_order()
    }

    /// Checks both stores.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.history.check_invariants()?;
        self.main.check_invariants()
    }

    /// Counters of the primary store.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.main.metrics_snapshot()
    }
}

impl<K, V> LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Primary-store lookup that neither counts as an access nor promotes.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.main.peek(key)
    }
}

impl<K, V> CoreCache<K, V> for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        if self.main.capacity() == 0 {
            return;
        }
        let count = self.record_access(&key);
        if count >= self.k {
            self.history.remove(&key);
            self.main.put(key, value);
            debug!(count, k = self.k, "lru-k admitted key into primary store");
            return;
        }
        // Below threshold: only a resident key gets its value refreshed.
        let _ = self.main.update(&key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        if self.main.capacity() == 0 {
            return None;
        }
        self.record_access(key);
        self.main.get(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    fn len(&self) -> usize {
        self.main.len()
    }

    fn capacity(&self) -> usize {
        self.main.capacity()
    }

    /// Drops resident values and all history counts.
    fn clear(&self) {
        self.history.clear();
        self.main.clear();
    }
}

impl<K, V> MutableCache<K, V> for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn remove(&self, key: &K) -> Option<V> {
        self.history.remove(key);
        self.main.remove(key)
    }
}

impl<K: Send, V: Send> ConcurrentCache for LruKCache<K, V> {}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruKCache")
            .field("main", &self.main)
            .field("history", &self.history)
            .field("k", &self.k)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod admission {
        use super::*;

        #[test]
        fn key_is_admitted_on_kth_access() {
            let cache = LruKCache::new(4, 8, 3);
            cache.put(1, "a");
            cache.put(1, "b");
            assert!(!cache.contains(&1));
            assert_eq!(cache.access_count(&1), Some(2));

            cache.put(1, "c");
            assert!(cache.contains(&1));
            assert_eq!(cache.access_count(&1), None);
            assert_eq!(cache.get(&1), Some("c"));
        }

        #[test]
        fn gets_count_toward_admission() {
            let cache = LruKCache::new(4, 8, 2);
            assert_eq!(cache.get(&7), None);
            cache.put(7, 70);
            assert_eq!(cache.get(&7), Some(70));
        }

        #[test]
        fn k_one_admits_immediately() {
            let cache = LruKCache::new(2, 2, 1);
            cache.put("x", 1);
            assert_eq!(cache.get(&"x"), Some(1));
        }

        #[test]
        fn k_zero_behaves_as_one() {
            let cache = LruKCache::new(2, 2, 0);
            assert_eq!(cache.k(), 1);
            cache.put("x", 1);
            assert!(cache.contains(&"x"));
        }

        #[test]
        fn admitted_key_stays_admitted() {
            let cache = LruKCache::new(4, 8, 2);
            cache.put(1, 10);
            cache.put(1, 11);
            for _ in 0..5 {
                assert_eq!(cache.get(&1), Some(11));
            }
            // The gets refilled history past k, so this put re-inserts.
            cache.put(1, 12);
            assert_eq!(cache.peek(&1), Some(12));
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn history_eviction_resets_count() {
            let cache = LruKCache::new(4, 2, 2);
            cache.put(1, 1);
            cache.put(2, 2);
            cache.put(3, 3);
            assert_eq!(cache.access_count(&1), None);
            assert_eq!(cache.history_len(), 2);

            cache.put(1, 1);
            assert!(!cache.contains(&1));
            assert_eq!(cache.access_count(&1), Some(1));
        }

        #[test]
        fn primary_evicts_lru() {
            let cache = LruKCache::new(2, 8, 1);
            cache.put(1, 1);
            cache.put(2, 2);
            cache.get(&1);
            cache.put(3, 3);
            assert_eq!(cache.recency_order(), vec![3, 1]);
            assert_eq!(cache.len(), 2);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn remove_drops_history_and_value() {
            let cache = LruKCache::new(2, 4, 2);
            cache.put(1, 1);
            cache.put(1, 1);
            cache.get(&1);
            assert_eq!(cache.remove(&1), Some(1));
            assert_eq!(cache.access_count(&1), None);
            assert!(cache.is_empty());
        }

        #[test]
        fn clear_drops_history() {
            let cache = LruKCache::new(2, 4, 3);
            cache.put(1, 1);
            cache.clear();
            assert_eq!(cache.history_len(), 0);
            cache.put(1, 1);
            cache.put(1, 1);
            assert!(!cache.contains(&1));
        }

        #[test]
        fn zero_capacity_never_stores() {
            let cache = LruKCache::new(0, 4, 1);
            cache.put(1, 1);
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.capacity(), 0);
        }

        #[test]
        fn zero_capacity_leaves_history_untouched() {
            let cache = LruKCache::new(0, 4, 2);
            cache.put(1, 1);
            cache.put(1, 1);
            cache.get(&2);
            assert_eq!(cache.history_len(), 0);
            assert_eq!(cache.access_count(&1), None);
            assert!(cache.is_empty());
            cache.check_invariants().unwrap();
        }

        #[test]
        fn zero_history_capacity_keeps_one_slot() {
            let cache = LruKCache::new(4, 0, 3);
            assert_eq!(cache.history_capacity(), 1);
            cache.put("a", 1);
            cache.put("b", 2);
            assert_eq!(cache.history_len(), 1);
            assert_eq!(cache.access_count(&"a"), None);
            assert_eq!(cache.access_count(&"b"), Some(1));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_below_threshold_never_hits(k in 2usize..6, key in 0u32..100) {
                let cache = LruKCache::new(8, 16, k);
                for _ in 0..(k - 1) {
                    cache.put(key, key);
                }
                prop_assert!(!cache.contains(&key));
                // The probe itself is the k-th access and admits nothing.
                prop_assert_eq!(cache.get(&key), None);
                cache.put(key, key);
                prop_assert_eq!(cache.get(&key), Some(key));
            }

            #[test]
            fn prop_capacity_holds(
                capacity in 0usize..8,
                k in 1usize..4,
                keys in prop::collection::vec(0u32..24, 0..200)
            ) {
                let cache = LruKCache::new(capacity, 8, k);
                for key in keys {
                    cache.put(key, key);
                    prop_assert!(cache.len() <= capacity);
                    prop_assert!(cache.history_len() <= 8);
                }
                prop_assert!(cache.check_invariants().is_ok());
            }
        }
    }
}
