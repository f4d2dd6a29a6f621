//! Eviction engines.
//!
//! | Engine                                   | Victim                                   |
//! |------------------------------------------|------------------------------------------|
//! | [`lru::LruCache`]                        | least recently used                      |
//! | [`lru_k::LruKCache`]                     | LRU, admitting keys only after `k` hits  |
//! | [`sharded_lru::ShardedLruCache`]         | per-shard least recently used            |
//! | [`lfu::LfuCache`]                        | least frequent, then least recent        |
//! | [`aging_lfu::AgingLfuCache`]             | as LFU, with periodic frequency decay    |
//!
//! The `*Core` types are the single-threaded engines with a `&mut self` API.
//! The `*Cache` types wrap one core in a `parking_lot::Mutex` and implement
//! [`CoreCache`](crate::traits::CoreCache).

pub mod aging_lfu;
pub mod lfu;
pub mod lru;
pub mod lru_k;
pub mod sharded_lru;
