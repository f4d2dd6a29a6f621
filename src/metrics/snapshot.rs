use std::ops::Add;

use crate::metrics::metrics_impl::CacheMetrics;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_new: u64,
    pub insert_updates: u64,

    pub evicted_entries: u64,
    pub aging_passes: u64,
    pub clears: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    pub(crate) fn capture(metrics: &CacheMetrics, cache_len: usize, capacity: usize) -> Self {
        Self {
            get_hits: metrics.get_hits,
            get_misses: metrics.get_misses,
            insert_new: metrics.insert_new,
            insert_updates: metrics.insert_updates,
            evicted_entries: metrics.evicted_entries,
            aging_passes: metrics.aging_passes,
            clears: metrics.clears,
            cache_len,
            capacity,
        }
    }

    pub fn get_calls(&self) -> u64 {
        self.get_hits + self.get_misses
    }

    /// Fraction of `get` calls that hit; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let calls = self.get_calls();
        if calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / calls as f64
        }
    }
}

/// Sums counters and gauges, e.g. across the shards of a sharded engine.
impl Add for CacheMetricsSnapshot {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            get_hits: self.get_hits + rhs.get_hits,
            get_misses: self.get_misses + rhs.get_misses,
            insert_new: self.insert_new + rhs.insert_new,
            insert_updates: self.insert_updates + rhs.insert_updates,
            evicted_entries: self.evicted_entries + rhs.evicted_entries,
            aging_passes: self.aging_passes + rhs.aging_passes,
            clears: self.clears + rhs.clears,
            cache_len: self.cache_len + rhs.cache_len,
            capacity: self.capacity + rhs.capacity,
        }
    }
}
