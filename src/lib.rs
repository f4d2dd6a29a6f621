//! evictkit: in-memory eviction engines.
//!
//! Five policies share one contract ([`traits::CoreCache`]): plain LRU,
//! admission-gated LRU-K, sharded LRU, O(1) LFU and an aging LFU whose
//! frequencies decay once their average crosses a ceiling. Every engine is
//! an arena of index-linked nodes behind a single `parking_lot::Mutex`.
//!
//! ```
//! use evictkit::prelude::*;
//!
//! let cache = CacheBuilder::new(2).build::<u32, &str>(CachePolicy::Lfu);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! cache.get(&1);
//! cache.put(3, "c");
//! assert!(!cache.contains(&2));
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;
