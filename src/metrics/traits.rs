//! # Metrics Trait Hierarchy
//!
//! Recording and snapshotting are split into small traits so cache policy
//! code only ever writes counters.
//!
//! ```text
//!          ┌─────────────────────────────┐
//!          │     CoreMetricsRecorder     │
//!          │  get_hit/get_miss/insert    │
//!          │  evict/clear                │
//!          └──────────────┬──────────────┘
//!                         │
//!                         ▼
//!          ┌─────────────────────────────┐
//!          │    AgingMetricsRecorder     │
//!          │  aging_pass                 │
//!          └─────────────────────────────┘
//!
//!   Consumption: MetricsSnapshotProvider<S> (bench/test/hit-rate reports)
//! ```

/// Common counters for any cache policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Counters specific to the aging LFU engine.
pub trait AgingMetricsRecorder: CoreMetricsRecorder {
    fn record_aging_pass(&mut self);
}

/// Produces a point-in-time copy of an engine's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
