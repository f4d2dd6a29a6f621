//! Per-engine counters, compiled in with the `metrics` feature.
//!
//! Engines record into a [`CacheMetrics`](metrics_impl::CacheMetrics) while
//! holding their own lock and expose a
//! [`CacheMetricsSnapshot`](snapshot::CacheMetricsSnapshot) through
//! `metrics_snapshot()`.

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
