//! Hit-rate comparison across every engine on a hot/cold key mix.
//!
//! 100 000 puts, then 50 000 gets. Within every block of 100 operations the
//! first 40 draw from 3 hot keys and the remaining 60 from 5 000 cold keys.
//!
//! Run with: cargo run --release --example hit_rate -- [capacity]
//! Set RUST_LOG=evictkit=debug to watch aging passes and LRU-K admissions.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use evictkit::builder::{CacheBuilder, CachePolicy};
use evictkit::traits::CoreCache;

const OPERATIONS: usize = 100_000;
const HOT_KEYS: u32 = 3;
const COLD_KEYS: u32 = 5_000;

fn next_key(op: usize, rng: &mut SmallRng) -> u32 {
    if op % 100 < 40 {
        rng.gen_range(0..HOT_KEYS)
    } else {
        HOT_KEYS + rng.gen_range(0..COLD_KEYS)
    }
}

fn run(policy: CachePolicy, capacity: usize, seed: u64) {
    let cache = CacheBuilder::new(capacity).build::<u32, String>(policy);
    let mut rng = SmallRng::seed_from_u64(seed);
    let start = Instant::now();

    for op in 0..OPERATIONS {
        let key = next_key(op, &mut rng);
        cache.put(key, format!("value{key}"));
    }

    let gets = OPERATIONS / 2;
    let hits = (0..gets)
        .filter(|&op| cache.get(&next_key(op, &mut rng)).is_some())
        .count();

    println!(
        "{:>12}  capacity {capacity:>5}  hit rate {:>6.2}%  ({:?})",
        policy.name(),
        100.0 * hits as f64 / gets as f64,
        start.elapsed()
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let capacity = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(50);

    for policy in [
        CachePolicy::Lru,
        CachePolicy::LruK {
            history_capacity: capacity * 2,
            k: 2,
        },
        CachePolicy::ShardedLru { shards: 0 },
        CachePolicy::Lfu,
        CachePolicy::aging_lfu(),
    ] {
        run(policy, capacity, 0x5eed);
    }
}
