//! Deterministic key-to-shard mapping.
//!
//! Used by [`ShardedLruCache`](crate::policy::sharded_lru::ShardedLruCache)
//! to route every key to exactly one shard for the lifetime of the engine.
//!
//! ```text
//!   FxHasher ◄── write_u64(seed)
//!       │
//!       ▼
//!   key.hash(..) ──► finish() % shards ──► shard index
//! ```
//!
//! `FxHasher` carries no per-process random state, so two selectors built with
//! the same `(shards, seed)` route every key identically.
//!
//! ```
//! use evictkit::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use rustc_hash::FxHasher;

/// Routes keys to `[0, shards)` with a seeded `FxHasher`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSelector {
    shards: NonZeroUsize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards; zero is treated as one.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: NonZeroUsize::new(shards).unwrap_or(NonZeroUsize::MIN),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.get()
    }

    /// Shard index owning `key`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = FxHasher::default();
        hasher.write_u64(self.seed);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.get() as u64) as usize
    }
}
