use evictkit::policy::aging_lfu::AgingLfuCache;
use evictkit::policy::lfu::LfuCache;
use evictkit::traits::CoreCache;

fn main() {
    let cache: LfuCache<&str, i32> = LfuCache::new(2);

    cache.put("a", 10);
    cache.put("b", 20);
    cache.get(&"a");
    cache.put("c", 30);

    println!("contains a? {}", cache.contains(&"a"));
    println!("contains b? {}", cache.contains(&"b"));
    println!("freq a: {:?}", cache.frequency(&"a"));

    let aging: AgingLfuCache<&str, i32> = AgingLfuCache::with_max_average(4, 4);
    aging.put("hot", 1);
    aging.put("cold", 2);
    for _ in 0..8 {
        aging.get(&"hot");
    }
    println!("aged freq hot: {:?}", aging.frequency(&"hot"));
    println!("average: {}", aging.average_frequency());
}

// Expected output:
// contains a? true
// contains b? false
// freq a: Some(2)
// aged freq hot: Some(7)
// average: 4
//
// Explanation: "a" was read once more than "b", so "b" sits in the lowest
// frequency bucket when "c" arrives. In the aging cache the 8th read pushes
// the average to 5 > 4, and every frequency drops by 2 (never below 1).
