//! Unified cache builder for all eviction policies.
//!
//! Picks an engine from a [`CachePolicy`] and hides it behind one
//! [`Cache`] type with the shared [`CoreCache`] operations.
//!
//! ## Example
//!
//! ```rust
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//! use evictkit::traits::CoreCache;
//!
//! let cache = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lru);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//!
//! let err = CacheBuilder::new(100)
//!     .try_build::<u64, String>(CachePolicy::LruK { history_capacity: 0, k: 2 })
//!     .unwrap_err();
//! assert!(err.message().contains("history"));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
pub use crate::policy::aging_lfu::DEFAULT_MAX_AVERAGE;
use crate::policy::aging_lfu::AgingLfuCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LruKCache;
use crate::policy::sharded_lru::ShardedLruCache;
use crate::traits::{ConcurrentCache, CoreCache, MutableCache};

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    Lru,
    /// LRU with an admission threshold: a key enters the cache on its
    /// `k`-th observed access, counted in a history of `history_capacity`
    /// keys.
    LruK { history_capacity: usize, k: usize },
    /// Independent LRU shards; `shards == 0` uses the available parallelism.
    ShardedLru { shards: usize },
    /// Least Frequently Used eviction (bucket-based, O(1)).
    Lfu,
    /// LFU whose frequencies are aged once their average exceeds
    /// `max_average`.
    AgingLfu { max_average: u64 },
}

impl CachePolicy {
    /// Aging LFU with [`DEFAULT_MAX_AVERAGE`].
    pub const fn aging_lfu() -> Self {
        CachePolicy::AgingLfu {
            max_average: DEFAULT_MAX_AVERAGE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CachePolicy::Lru => "lru",
            CachePolicy::LruK { .. } => "lru-k",
            CachePolicy::ShardedLru { .. } => "sharded-lru",
            CachePolicy::Lfu => "lfu",
            CachePolicy::AgingLfu { .. } => "aging-lfu",
        }
    }
}

/// Unified cache wrapper that provides a consistent API regardless of policy.
pub struct Cache<K, V> {
    policy: CachePolicy,
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V> {
    Lru(LruCache<K, V>),
    LruK(LruKCache<K, V>),
    ShardedLru(ShardedLruCache<K, V>),
    Lfu(LfuCache<K, V>),
    AgingLfu(AgingLfuCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// The policy this cache was built with.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn engine(&self) -> &dyn CoreCache<K, V> {
        match &self.inner {
            CacheInner::Lru(c) => c,
            CacheInner::LruK(c) => c,
            CacheInner::ShardedLru(c) => c,
            CacheInner::Lfu(c) => c,
            CacheInner::AgingLfu(c) => c,
        }
    }

    /// Removes `key` for the LRU family. LFU engines have no removal
    /// operation and report `None` without touching the cache.
    pub fn remove(&self, key: &K) -> Option<V> {
        match &self.inner {
            CacheInner::Lru(c) => c.remove(key),
            CacheInner::LruK(c) => c.remove(key),
            CacheInner::ShardedLru(c) => c.remove(key),
            CacheInner::Lfu(_) | CacheInner::AgingLfu(_) => None,
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match &self.inner {
            CacheInner::Lru(c) => c.check_invariants(),
            CacheInner::LruK(c) => c.check_invariants(),
            CacheInner::ShardedLru(c) => c.check_invariants(),
            CacheInner::Lfu(c) => c.check_invariants(),
            CacheInner::AgingLfu(c) => c.check_invariants(),
        }
    }

    #[cfg(feature = "metrics")]
    fn reporter(&self) -> &dyn MetricsSnapshotProvider<CacheMetricsSnapshot> {
        match &self.inner {
            CacheInner::Lru(c) => c,
            CacheInner::LruK(c) => c,
            CacheInner::ShardedLru(c) => c,
            CacheInner::Lfu(c) => c,
            CacheInner::AgingLfu(c) => c,
        }
    }

    /// Counters of the underlying engine.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.reporter().snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> CoreCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        self.engine().put(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.engine().get(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.engine().contains(key)
    }

    fn len(&self) -> usize {
        self.engine().len()
    }

    fn capacity(&self) -> usize {
        self.engine().capacity()
    }

    fn clear(&self) {
        self.engine().clear();
    }
}

impl<K: Send, V: Send> ConcurrentCache for Cache<K, V> {}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Build a cache with the specified policy.
    ///
    /// Never fails: degenerate settings fall back to each engine's own
    /// handling (zero capacity stores nothing, `k == 0` acts as 1, a zero
    /// ceiling acts as 1). Use [`try_build`](Self::try_build) to reject them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use evictkit::builder::{CacheBuilder, CachePolicy};
    ///
    /// let lru_k = CacheBuilder::new(100)
    ///     .build::<u64, String>(CachePolicy::LruK { history_capacity: 200, k: 2 });
    /// let sharded = CacheBuilder::new(100)
    ///     .build::<u64, String>(CachePolicy::ShardedLru { shards: 8 });
    /// let aging = CacheBuilder::new(100).build::<u64, String>(CachePolicy::aging_lfu());
    /// ```
    pub fn build<K, V>(self, policy: CachePolicy) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let inner = match policy {
            CachePolicy::Lru => CacheInner::Lru(LruCache::new(self.capacity)),
            CachePolicy::LruK { history_capacity, k } => {
                CacheInner::LruK(LruKCache::new(self.capacity, history_capacity, k))
            },
            CachePolicy::ShardedLru { shards } => {
                CacheInner::ShardedLru(ShardedLruCache::new(self.capacity, shards))
            },
            CachePolicy::Lfu => CacheInner::Lfu(LfuCache::new(self.capacity)),
            CachePolicy::AgingLfu { max_average } => {
                CacheInner::AgingLfu(AgingLfuCache::with_max_average(self.capacity, max_average))
            },
        };

        Cache { policy, inner }
    }

    /// Like [`build`](Self::build), but rejects configurations that would
    /// produce a degenerate cache.
    pub fn try_build<K, V>(self, policy: CachePolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        self.validate(policy)?;
        Ok(self.build(policy))
    }

    fn validate(&self, policy: CachePolicy) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new(format!(
                "{} capacity must be greater than zero",
                policy.name()
            )));
        }
        match policy {
            CachePolicy::LruK { k: 0, .. } => {
                Err(ConfigError::new("lru-k threshold k must be greater than zero"))
            },
            CachePolicy::LruK {
                history_capacity: 0,
                ..
            } => Err(ConfigError::new(
                "lru-k history capacity must be greater than zero",
            )),
            CachePolicy::AgingLfu { max_average: 0 } => Err(ConfigError::new(
                "aging-lfu max_average must be greater than zero",
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_policies() -> [CachePolicy; 5] {
        [
            CachePolicy::Lru,
            CachePolicy::LruK {
                history_capacity: 20,
                k: 1,
            },
            CachePolicy::ShardedLru { shards: 1 },
            CachePolicy::Lfu,
            CachePolicy::aging_lfu(),
        ]
    }

    #[test]
    fn test_all_policies_basic_ops() {
        for policy in all_policies() {
            let cache = CacheBuilder::new(10).build::<u64, String>(policy);

            cache.put(1, "one".to_string());
            cache.put(2, "two".to_string());

            assert_eq!(cache.get(&1), Some("one".to_string()), "{}", policy.name());
            assert_eq!(cache.get(&2), Some("two".to_string()));
            assert_eq!(cache.get(&3), None);
            assert_eq!(cache.get_or_default(&3), String::new());

            assert!(cache.contains(&1));
            assert!(!cache.contains(&99));

            assert_eq!(cache.len(), 2);
            assert!(!cache.is_empty());

            cache.put(1, "ONE".to_string());
            assert_eq!(cache.get(&1), Some("ONE".to_string()));
            cache.check_invariants().unwrap();

            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.policy(), policy);
        }
    }

    #[test]
    fn test_capacity_enforcement() {
        let cache = CacheBuilder::new(2).build::<u64, String>(CachePolicy::Lru);

        cache.put(1, "one".to_string());
        cache.put(2, "two".to_string());
        cache.put(3, "three".to_string());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn test_remove_only_for_lru_family() {
        let lru = CacheBuilder::new(4).build::<u8, u8>(CachePolicy::Lru);
        lru.put(1, 1);
        assert_eq!(lru.remove(&1), Some(1));

        let lfu = CacheBuilder::new(4).build::<u8, u8>(CachePolicy::Lfu);
        lfu.put(1, 1);
        assert_eq!(lfu.remove(&1), None);
        assert!(lfu.contains(&1));
    }

    #[test]
    fn test_try_build_rejects_degenerate_config() {
        let zero = CacheBuilder::new(0).try_build::<u8, u8>(CachePolicy::Lru);
        assert!(zero.unwrap_err().message().contains("capacity"));

        let k0 = CacheBuilder::new(4).try_build::<u8, u8>(CachePolicy::LruK {
            history_capacity: 4,
            k: 0,
        });
        assert!(k0.is_err());

        let ceiling =
            CacheBuilder::new(4).try_build::<u8, u8>(CachePolicy::AgingLfu { max_average: 0 });
        assert!(ceiling.is_err());

        for policy in all_policies() {
            assert!(CacheBuilder::new(4).try_build::<u8, u8>(policy).is_ok());
        }
        assert!(
            CacheBuilder::new(4)
                .try_build::<u8, u8>(CachePolicy::ShardedLru { shards: 0 })
                .is_ok()
        );
    }

    #[test]
    fn test_build_tolerates_degenerate_config() {
        let cache = CacheBuilder::new(0).build::<u8, u8>(CachePolicy::Lfu);
        cache.put(1, 1);
        assert_eq!(cache.get(&1), None);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_snapshots_through_provider_trait() {
        fn hits_and_misses<P>(provider: &P) -> (u64, u64)
        where
            P: MetricsSnapshotProvider<CacheMetricsSnapshot>,
        {
            let snap = provider.snapshot();
            (snap.get_hits, snap.get_misses)
        }

        for policy in all_policies() {
            let cache = CacheBuilder::new(4).build::<u64, u64>(policy);
            cache.put(1, 1);
            cache.get(&1);
            cache.get(&2);
            assert_eq!(hits_and_misses(&cache), (1, 1), "{}", policy.name());
        }

        let sharded = ShardedLruCache::new(8, 2);
        sharded.put(1u64, 1u64);
        sharded.get(&1);
        sharded.get(&1);
        assert_eq!(hits_and_misses(&sharded), (2, 0));

        let lru_k = LruKCache::new(4, 4, 2);
        lru_k.put(1u64, 1u64);
        lru_k.get(&1);
        assert_eq!(hits_and_misses(&lru_k), (0, 1));
    }
}
