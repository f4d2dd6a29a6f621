use crate::metrics::traits::{AgingMetricsRecorder, CoreMetricsRecorder};

#[derive(Debug, Default, Clone)]
pub struct CacheMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    pub aging_passes: u64,
    pub clears: u64,
}

impl CoreMetricsRecorder for CacheMetrics {
    #[inline]
    fn record_get_hit(&mut self) {
        self.get_hits += 1;
    }

    #[inline]
    fn record_get_miss(&mut self) {
        self.get_misses += 1;
    }

    #[inline]
    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    #[inline]
    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    #[inline]
    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    #[inline]
    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl AgingMetricsRecorder for CacheMetrics {
    #[inline]
    fn record_aging_pass(&mut self) {
        self.aging_passes += 1;
    }
}
