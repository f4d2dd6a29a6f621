//! Sharded LRU: a fixed table of independent [`LruCache`] shards.
//!
//! Keys are routed by [`ShardSelector`] and every operation runs under the
//! lock of its one shard only. There is no global recency order; each shard
//! evicts its own least recently used entry.
//!
//! Every shard gets `⌈capacity / shards⌉` slots, so the aggregate
//! [`capacity`](CoreCache::capacity) can exceed the configured nominal
//! capacity by up to `shards - 1` entries.
//!
//! ```
//! use evictkit::policy::sharded_lru::ShardedLruCache;
//! use evictkit::traits::CoreCache;
//!
//! let cache = ShardedLruCache::new(10, 4);
//! assert_eq!(cache.shard_count(), 4);
//! assert_eq!(cache.capacity(), 12);
//!
//! cache.put("k", 1);
//! assert_eq!(cache.get(&"k"), Some(1));
//! ```

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::thread;

use tracing::debug;

use crate::ds::shard::ShardSelector;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::policy::lru::LruCache;
use crate::traits::{ConcurrentCache, CoreCache, MutableCache};

pub struct ShardedLruCache<K, V> {
    shards: Box<[LruCache<K, V>]>,
    selector: ShardSelector,
    nominal_capacity: usize,
}

impl<K, V> ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates `shard_count` shards sharing `capacity`.
    ///
    /// `shard_count == 0` uses the available parallelism of the host.
    pub fn new(capacity: usize, shard_count: usize) -> Self {
        Self::with_seed(capacity, shard_count, 0)
    }

    /// Like [`new`](Self::new) with an explicit routing seed.
    pub fn with_seed(capacity: usize, shard_count: usize, seed: u64) -> Self {
        let shard_count = if shard_count == 0 {
            thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            shard_count
        };
        let per_shard = capacity.div_ceil(shard_count);
        debug!(shard_count, per_shard, capacity, "building sharded lru");

        let shards = (0..shard_count).map(|_| LruCache::new(per_shard)).collect();
        Self {
            shards,
            selector: ShardSelector::new(shard_count, seed),
            nominal_capacity: capacity,
        }
    }

    fn shard(&self, key: &K) -> &LruCache<K, V> {
        &self.shards[self.selector.shard_for_key(key)]
    }

    /// Index of the shard that owns `key`.
    pub fn shard_for(&self, key: &K) -> usize {
        self.selector.shard_for_key(key)
    }

    /// Number of shards, after resolving `0` to the host's parallelism.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::sharded_lru::ShardedLruCache;
    ///
    /// let cache: ShardedLruCache<u64, u64> = ShardedLruCache::new(100, 8);
    /// assert_eq!(cache.shard_count(), 8);
    ///
    /// let auto: ShardedLruCache<u64, u64> = ShardedLruCache::new(100, 0);
    /// assert!(auto.shard_count() >= 1);
    /// ```
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Resident entries of one shard, or `None` for an out-of-range index.
    pub fn shard_len(&self, shard: usize) -> Option<usize> {
        self.shards.get(shard).map(|s| s.len())
    }

    /// The capacity requested at construction, before rounding.
    pub fn nominal_capacity(&self) -> usize {
        self.nominal_capacity
    }

    /// Checks every shard in turn; the error names the first failing shard.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (i, shard) in self.shards.iter().enumerate() {
            shard
                .check_invariants()
                .map_err(|e| InvariantError::new(format!("shard {i}: {e}")))?;
        }
        Ok(())
    }

    /// Counters summed over all shards.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.shards
            .iter()
            .map(LruCache::metrics_snapshot)
            .fold(CacheMetricsSnapshot::default(), |acc, s| acc + s)
    }
}

impl<K, V> ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn peek(&self, key: &K) -> Option<V> {
        self.shard(key).peek(key)
    }
}

impl<K, V> CoreCache<K, V> for ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        self.shard(&key).put(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.shard(key).get(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.shard(key).contains(key)
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    /// Sum of the per-shard capacities.
    fn capacity(&self) -> usize {
        self.shards.iter().map(|s| s.capacity()).sum()
    }

    fn clear(&self) {
        for shard in self.shards.iter() {
            shard.clear();
        }
    }
}

impl<K, V> MutableCache<K, V> for ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn remove(&self, key: &K) -> Option<V> {
        self.shard(key).remove(key)
    }
}

impl<K: Send, V: Send> ConcurrentCache for ShardedLruCache<K, V> {}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for ShardedLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedLruCache")
            .field("shards", &self.shards.len())
            .field("selector", &self.selector)
            .field("nominal_capacity", &self.nominal_capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_up_per_shard() {
        let cache: ShardedLruCache<u32, u32> = ShardedLruCache::new(10, 3);
        assert_eq!(cache.shard_count(), 3);
        assert_eq!(cache.capacity(), 12);
        assert_eq!(cache.nominal_capacity(), 10);
    }

    #[test]
    fn zero_shards_uses_parallelism() {
        let cache: ShardedLruCache<u32, u32> = ShardedLruCache::new(64, 0);
        assert!(cache.shard_count() >= 1);
    }

    #[test]
    fn zero_capacity_is_noop() {
        let cache = ShardedLruCache::new(0, 4);
        cache.put(1, 1);
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn keys_land_in_their_routed_shard() {
        let cache = ShardedLruCache::new(128, 4);
        for key in 0..32u32 {
            cache.put(key, key);
        }
        let mut expected = [0usize; 4];
        for key in 0..32u32 {
            expected[cache.shard_for(&key)] += 1;
        }
        for (i, &count) in expected.iter().enumerate() {
            assert_eq!(cache.shard_len(i), Some(count));
        }
        assert_eq!(cache.shard_len(4), None);
        assert_eq!(cache.len(), 32);
    }

    #[test]
    fn shard_len_works_for_non_clone_values() {
        struct Blob(#[allow(dead_code)] Vec<u8>);

        let cache: ShardedLruCache<u32, Blob> = ShardedLruCache::new(8, 2);
        for key in 0..4u32 {
            cache.shard(&key).insert(key, Blob(vec![0; 4]));
        }
        let total: usize = (0..2).filter_map(|i| cache.shard_len(i)).sum();
        assert_eq!(total, 4);
        assert_eq!(cache.shard_len(2), None);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn single_shard_is_plain_lru() {
        let cache = ShardedLruCache::new(2, 1);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);
        cache.put(3, "c");
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.get(&3), Some("c"));
    }

    #[test]
    fn remove_and_clear() {
        let cache = ShardedLruCache::new(16, 4);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.peek(&"b"), Some(2));
        cache.clear();
        assert!(cache.is_empty());
        cache.check_invariants().unwrap();
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_routing_is_stable(shards in 1usize..16, keys in prop::collection::vec(any::<u64>(), 1..64)) {
                let cache: ShardedLruCache<u64, ()> = ShardedLruCache::new(128, shards);
                for key in &keys {
                    let first = cache.shard_for(key);
                    cache.put(*key, ());
                    prop_assert_eq!(cache.shard_for(key), first);
                    prop_assert!(first < shards);
                }
            }

            #[test]
            fn prop_each_shard_within_capacity(
                capacity in 0usize..32,
                shards in 1usize..6,
                keys in prop::collection::vec(0u32..128, 0..300)
            ) {
                let cache = ShardedLruCache::new(capacity, shards);
                for key in keys {
                    cache.put(key, key);
                }
                let per_shard = capacity.div_ceil(shards);
                for i in 0..shards {
                    prop_assert!(cache.shard_len(i).unwrap_or(0) <= per_shard);
                }
                prop_assert!(cache.len() <= cache.capacity());
            }
        }
    }
}
