//! DHAT heap profile of every eviction engine.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use evictkit::builder::{Cache, CacheBuilder, CachePolicy};
use evictkit::traits::CoreCache;

const CAPACITY: usize = 4096;
const OPERATIONS: usize = 100_000;
const UNIVERSE: u64 = 16_384;

/// xorshift64; keeps the binary free of RNG dependencies.
struct KeyStream(u64);

impl KeyStream {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// 90% of draws from the lowest tenth of the universe.
    fn hot_key(&mut self) -> u64 {
        let hot = UNIVERSE / 10;
        if self.next() % 10 != 0 {
            self.next() % hot
        } else {
            hot + self.next() % (UNIVERSE - hot)
        }
    }
}

fn read_through(cache: &Cache<u64, Vec<u8>>, key: u64) {
    if cache.get(&key).is_none() {
        cache.put(key, key.to_le_bytes().to_vec());
    }
}

fn profile(policy: CachePolicy) {
    println!("=== {} ===", policy.name());
    let cache = CacheBuilder::new(CAPACITY).build::<u64, Vec<u8>>(policy);

    for key in 0..CAPACITY as u64 {
        cache.put(key, key.to_le_bytes().to_vec());
    }

    let mut keys = KeyStream(42);
    for _ in 0..OPERATIONS {
        read_through(&cache, keys.hot_key());
    }
    for i in 0..OPERATIONS / 2 {
        read_through(&cache, i as u64 % UNIVERSE);
    }
    for i in 0..OPERATIONS / 4 {
        cache.put(UNIVERSE + i as u64, Vec::new());
    }

    println!("  final size: {}", cache.len());
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    for policy in [
        CachePolicy::Lru,
        CachePolicy::LruK {
            history_capacity: CAPACITY * 2,
            k: 2,
        },
        CachePolicy::ShardedLru { shards: 8 },
        CachePolicy::Lfu,
        CachePolicy::aging_lfu(),
    ] {
        profile(policy);
    }

    println!("\nwrote dhat-heap.json");
}
