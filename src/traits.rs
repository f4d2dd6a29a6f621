//! # Cache Trait Hierarchy
//!
//! The uniform get/put contract every engine satisfies, plus removal for the
//! LRU family.
//!
//! ```text
//!                 ┌─────────────────────────────────────────┐
//!                 │            CoreCache<K, V>              │
//!                 │                                         │
//!                 │  put(&, K, V)                           │
//!                 │  get(&, &K) → Option<V>                 │
//!                 │  get_or_default(&, &K) → V              │
//!                 │  contains(&, &K) → bool                 │
//!                 │  len / is_empty / capacity / clear      │
//!                 └──────────────────┬──────────────────────┘
//!                                    │
//!                                    ▼
//!                 ┌─────────────────────────────────────────┐
//!                 │          MutableCache<K, V>             │
//!                 │  remove(&, &K) → Option<V>              │
//!                 │                                         │
//!                 │  LruCache, LruKCache, ShardedLruCache   │
//!                 └─────────────────────────────────────────┘
//! ```
//!
//! All methods take `&self`: every engine serializes calls behind its own
//! lock, so a single instance can be shared across threads (see
//! [`ConcurrentCache`]). The single-threaded cores (`LruCore`, `LfuCore`,
//! `AgingLfuCore`) expose the same operations over `&mut self` as inherent
//! methods.
//!
//! ## Policy Comparison
//!
//! | Policy      | Eviction Basis                 | Supports Remove |
//! |-------------|--------------------------------|-----------------|
//! | LRU         | Last access                    | Yes             |
//! | LRU-K       | Last access, admitted after K  | Yes             |
//! | Sharded LRU | Last access, per shard         | Yes             |
//! | LFU         | Frequency, then recency        | No              |
//! | Aging LFU   | Aged frequency, then recency   | No              |
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru::LruCache;
//! use evictkit::policy::lfu::LfuCache;
//! use evictkit::traits::CoreCache;
//!
//! fn warm<C: CoreCache<u64, String>>(cache: &C, data: &[(u64, &str)]) {
//!     for (key, value) in data {
//!         cache.put(*key, value.to_string());
//!     }
//! }
//!
//! let lru = LruCache::new(10);
//! let lfu = LfuCache::new(10);
//! warm(&lru, &[(1, "one"), (2, "two")]);
//! warm(&lfu, &[(1, "one"), (2, "two")]);
//! assert_eq!(lru.get(&1), Some("one".to_string()));
//! assert_eq!(lfu.get_or_default(&3), String::new());
//! ```

/// Operations shared by every eviction policy.
pub trait CoreCache<K, V> {
    /// Inserts or overwrites `key`.
    ///
    /// Inserting a new key into a full cache evicts exactly one entry chosen
    /// by the policy. A zero-capacity cache ignores the call.
    fn put(&self, key: K, value: V);

    /// Returns a copy of the value for `key`, promoting it per the policy.
    ///
    /// Never changes the set of resident keys.
    fn get(&self, key: &K) -> Option<V>;

    /// Like [`get`](Self::get) but yields `V::default()` on a miss.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Checks residency without promoting.
    fn contains(&self, key: &K) -> bool;

    /// Number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured maximum number of resident entries.
    fn capacity(&self) -> usize;

    /// Drops every entry.
    fn clear(&self);
}

/// Caches that support arbitrary key-based removal.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes `key` if resident and returns its value; no-op otherwise.
    fn remove(&self, key: &K) -> Option<V>;
}

/// Marker for cache types that are safe to share across threads.
pub trait ConcurrentCache: Send + Sync {}
