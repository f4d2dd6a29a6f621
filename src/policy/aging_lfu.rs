//! # Aging LFU Engine
//!
//! The [`lfu`](crate::policy::lfu) bucket machinery plus a ceiling on the
//! average resident frequency. Plain LFU lets a key that was hot once keep
//! its huge count forever; here, whenever `total / len` rises above
//! `max_average`, every resident frequency is lowered by `max_average / 2`
//! (never below 1) and re-bucketed.
//!
//! ```text
//!   max_average = 4, delta = 2
//!
//!   before:  a:9  b:3  c:1        total 13, len 3, average 4
//!   get(a):  a:10 b:3  c:1        total 14, average 4 (floor)  -> ok
//!   get(a):  a:11 b:3  c:1        total 15, average 5 > 4      -> age
//!   after:   a:9  b:1  c:1        total 11, average 3
//! ```
//!
//! Passes repeat until the average is back at or under the ceiling, so the
//! bound holds whenever a call returns. An aging pass is O(len); it is
//! amortised over the accesses that pushed the average up.
//!
//! The average of an empty cache is 0 and never triggers aging.

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{AgingMetricsRecorder, CoreMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{ConcurrentCache, CoreCache};

/// Average-frequency ceiling used by [`AgingLfuCore::new`].
pub const DEFAULT_MAX_AVERAGE: u64 = 20;

/// Single-threaded aging LFU core.
pub struct AgingLfuCore<K, V> {
    freq: FrequencyBuckets<K, V>,
    capacity: usize,
    max_average: u64,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> AgingLfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core with the default ceiling of [`DEFAULT_MAX_AVERAGE`].
    pub fn new(capacity: usize) -> Self {
        Self::with_max_average(capacity, DEFAULT_MAX_AVERAGE)
    }

    /// Creates a core with an explicit ceiling; 0 is raised to 1.
    pub fn with_max_average(capacity: usize, max_average: u64) -> Self {
        Self {
            freq: FrequencyBuckets::new(capacity),
            capacity,
            max_average: max_average.max(1),
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Like [`with_max_average`](Self::with_max_average) but rejects a zero
    /// ceiling instead of raising it.
    pub fn try_new(capacity: usize, max_average: u64) -> Result<Self, ConfigError> {
        if max_average == 0 {
            return Err(ConfigError::new("aging lfu max_average must be greater than zero"));
        }
        Ok(Self::with_max_average(capacity, max_average))
    }

    /// `total_frequency / len` (integer division), 0 when empty.
    pub fn average_frequency(&self) -> u64 {
        match self.freq.len() as u64 {
            0 => 0,
            len => self.freq.total_freq() / len,
        }
    }

    fn age_if_needed(&mut self) {
        let delta = (self.max_average / 2).max(1);
        while self.average_frequency() > self.max_average {
            let before = self.freq.total_freq();
            let buckets_walked = self.freq.age_by(delta);

            #[cfg(feature = "metrics")]
            self.metrics.record_aging_pass();

            debug!(
                len = self.freq.len(),
                buckets_walked,
                total_before = before,
                total_after = self.freq.total_freq(),
                min_freq = self.freq.min_freq(),
                "aging lfu pass"
            );
            if self.freq.total_freq() == before {
                break;
            }
        }
    }

    /// Looks up `key`, bumping its frequency on a hit and aging if the
    /// average crosses the ceiling.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.freq.contains(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.freq.touch(key)?;
        self.age_if_needed();
        self.freq.peek(key)
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(id) = self.freq.touch(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let old = self.freq.value_mut(id).map(|slot| std::mem::replace(slot, value));
            self.age_if_needed();
            return old;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.freq.len() >= self.capacity
            && let Some((_, _, victim_freq)) = self.freq.evict_min()
        {
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();

            trace!(victim_freq, capacity = self.capacity, "aging lfu evicted least frequent entry");
        }
        self.freq.insert_new(key, value);
        self.age_if_needed();
        None
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        self.freq.peek(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.freq.contains(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.freq.frequency(key)
    }

    pub fn min_frequency(&self) -> u64 {
        self.freq.min_freq()
    }

    /// Sum of all resident frequencies.
    pub fn total_frequency(&self) -> u64 {
        self.freq.total_freq()
    }

    pub fn max_average(&self) -> u64 {
        self.max_average
    }

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

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.freq.clear();
    }

    /// Bucket consistency plus the average ceiling.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.freq.check_invariants()?;
        if self.freq.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "aging lfu holds {} entries over capacity {}",
                self.freq.len(),
                self.capacity
            )));
        }
        let average = self.average_frequency();
        if average > self.max_average {
            return Err(InvariantError::new(format!(
                "average frequency {average} exceeds ceiling {}",
                self.max_average
            )));
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot::capture(&self.metrics, self.freq.len(), self.capacity)
    }
}

impl<K, V> fmt::Debug for AgingLfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgingLfuCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("total_freq", &self.total_frequency())
            .field("max_average", &self.max_average)
            .finish_non_exhaustive()
    }
}

/// Thread-safe aging LFU engine.
pub struct AgingLfuCache<K, V> {
    inner: Mutex<AgingLfuCore<K, V>>,
}

impl<K, V> AgingLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an engine with the default ceiling of [`DEFAULT_MAX_AVERAGE`].
    pub fn new(capacity: usize) -> Self {
        Self::with_max_average(capacity, DEFAULT_MAX_AVERAGE)
    }

    /// Creates an engine whose average frequency never stays above
    /// `max_average`; 0 is raised to 1.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::aging_lfu::AgingLfuCache;
    /// use evictkit::traits::CoreCache;
    ///
    /// let cache = AgingLfuCache::with_max_average(4, 2);
    /// cache.put("a", 1);
    /// for _ in 0..5 {
    ///     cache.get(&"a");
    /// }
    /// assert!(cache.average_frequency() <= 2);
    /// assert_eq!(cache.max_average(), 2);
    /// ```
    pub fn with_max_average(capacity: usize, max_average: u64) -> Self {
        Self {
            inner: Mutex::new(AgingLfuCore::with_max_average(capacity, max_average)),
        }
    }

    /// Fallible constructor: a zero `max_average` is a [`ConfigError`].
    ///
    /// ```
    /// use evictkit::policy::aging_lfu::AgingLfuCache;
    ///
    /// assert!(AgingLfuCache::<u32, u32>::try_new(8, 0).is_err());
    /// assert_eq!(AgingLfuCache::<u32, u32>::try_new(8, 5).unwrap().max_average(), 5);
    /// ```
    pub fn try_new(capacity: usize, max_average: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Mutex::new(AgingLfuCore::try_new(capacity, max_average)?),
        })
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    pub fn min_frequency(&self) -> u64 {
        self.inner.lock().min_frequency()
    }

    pub fn total_frequency(&self) -> u64 {
        self.inner.lock().total_frequency()
    }

    pub fn average_frequency(&self) -> u64 {
        self.inner.lock().average_frequency()
    }

    pub fn max_average(&self) -> u64 {
        self.inner.lock().max_average()
    }

    /// See [`AgingLfuCore::check_invariants`].
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> AgingLfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }
}

impl<K, V> CoreCache<K, V> for AgingLfuCache<K, V>
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

impl<K: Send, V: Send> ConcurrentCache for AgingLfuCache<K, V> {}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for AgingLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for AgingLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AgingLfuCache").field(&*self.inner.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod basic_behavior {
        use super::*;

        #[test]
        fn behaves_as_lfu_below_ceiling() {
            let cache = AgingLfuCache::new(2);
            cache.put(1, "a");
            cache.put(2, "b");
            cache.get(&1);
            cache.put(3, "c");
            assert_eq!(cache.get(&2), None);
            assert_eq!(cache.get(&1), Some("a"));
            assert_eq!(cache.frequency(&1), Some(3));
            assert_eq!(cache.max_average(), DEFAULT_MAX_AVERAGE);
        }

        #[test]
        fn crossing_ceiling_ages_every_entry() {
            let mut core = AgingLfuCore::with_max_average(4, 4);
            core.put("a", ());
            core.put("b", ());
            for _ in 0..8 {
                core.get(&"a");
            }
            // a:9 b:1 -> total 10, average 5 > 4 -> minus 2 each (b clamps).
            assert_eq!(core.frequency(&"a"), Some(7));
            assert_eq!(core.frequency(&"b"), Some(1));
            assert_eq!(core.total_frequency(), 8);
            assert_eq!(core.min_frequency(), 1);
            core.check_invariants().unwrap();
        }

        #[test]
        fn total_tracks_insert_touch_and_eviction() {
            let mut core = AgingLfuCore::new(2);
            core.put(1, ());
            core.put(2, ());
            core.get(&1);
            core.get(&1);
            assert_eq!(core.total_frequency(), 4);
            core.put(3, ());
            // 2 (freq 1) evicted, 3 inserted at 1.
            assert_eq!(core.total_frequency(), 4);
            assert_eq!(core.average_frequency(), 2);
        }

        #[test]
        fn aging_preserves_recency_within_bucket() {
            let mut core = AgingLfuCore::with_max_average(8, 2);
            core.put(1, ());
            core.put(2, ());
            core.put(3, ());
            // Drive the average over 2 with hits on 3 only.
            for _ in 0..6 {
                core.get(&3);
            }
            core.check_invariants().unwrap();
            // 1 and 2 stayed at 1; 1 is older and goes first.
            core.put(4, ());
            core.put(5, ());
            core.put(6, ());
            core.put(7, ());
            core.put(8, ());
            core.put(9, ());
            assert!(!core.contains(&1));
            assert!(core.contains(&2));
        }
    }

    mod edge_cases {
        use super::*;

        #[test]
        fn single_hot_key_ages_on_every_access() {
            let mut core = AgingLfuCore::with_max_average(50, 20);
            for key in 0..50u32 {
                core.put(key, key);
            }
            for _ in 0..5_000 {
                assert_eq!(core.get(&0), Some(&0));
                assert!(core.average_frequency() <= 20);
            }
            assert_eq!(core.len(), 50);
            assert!(core.frequency(&0) > core.frequency(&1));
            assert_eq!(core.min_frequency(), 1);
            core.check_invariants().unwrap();
        }

        #[test]
        fn zero_max_average_is_rejected_or_raised() {
            assert!(AgingLfuCore::<u32, u32>::try_new(4, 0).is_err());
            assert!(AgingLfuCache::<u32, u32>::try_new(4, 0).is_err());
            let core: AgingLfuCore<u32, u32> = AgingLfuCore::with_max_average(4, 0);
            assert_eq!(core.max_average(), 1);
        }

        #[test]
        fn empty_average_is_zero() {
            let mut core: AgingLfuCore<u32, u32> = AgingLfuCore::new(1);
            assert_eq!(core.average_frequency(), 0);
            core.put(1, 1);
            core.clear();
            assert_eq!(core.average_frequency(), 0);
            assert_eq!(core.total_frequency(), 0);
            core.check_invariants().unwrap();
        }

        #[test]
        fn zero_capacity_is_noop() {
            let cache = AgingLfuCache::new(0);
            cache.put(1, 1);
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.total_frequency(), 0);
        }

        #[test]
        fn single_entry_with_ceiling_one() {
            let mut core = AgingLfuCore::with_max_average(1, 1);
            core.put("x", 0);
            for _ in 0..50 {
                assert_eq!(core.get(&"x"), Some(&0));
                assert!(core.average_frequency() <= 1);
            }
            core.check_invariants().unwrap();
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn records_aging_passes() {
            let cache = AgingLfuCache::with_max_average(1, 2);
            cache.put(1, 1);
            for _ in 0..4 {
                cache.get(&1);
            }
            assert!(cache.metrics_snapshot().aging_passes >= 1);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_average_never_exceeds_ceiling(
                capacity in 1usize..16,
                max_average in 1u64..10,
                ops in prop::collection::vec((any::<bool>(), 0u32..8), 0..300)
            ) {
                let mut core = AgingLfuCore::with_max_average(capacity, max_average);
                for (is_put, key) in ops {
                    if is_put {
                        core.put(key, key);
                    } else {
                        core.get(&key);
                    }
                    prop_assert!(core.average_frequency() <= max_average);
                    prop_assert!(core.len() <= capacity);
                    prop_assert!(core.check_invariants().is_ok());
                }
            }
        }
    }
}
