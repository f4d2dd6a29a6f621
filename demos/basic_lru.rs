use evictkit::policy::lru::LruCache;
use evictkit::traits::{CoreCache, MutableCache};

fn main() {
    let cache: LruCache<u32, String> = LruCache::new(2);

    cache.put(1, "alpha".to_string());
    cache.put(2, "beta".to_string());

    if let Some(value) = cache.get(&1) {
        println!("hit 1: {value}");
    }

    cache.put(3, "gamma".to_string());

    println!("contains 2? {}", cache.contains(&2));
    println!("recency: {:?}", cache.recency_order());
    println!("removed 1: {:?}", cache.remove(&1));
}

// Expected output:
// hit 1: alpha
// contains 2? false
// recency: [3, 1]
// removed 1: Some("alpha")
//
// Explanation: capacity=2; after get(&1), key 1 is MRU and key 2 is LRU.
// Putting key 3 evicts key 2.
