// ==============================================
// CROSS-POLICY INVARIANT TESTS (integration)
// ==============================================
//
// Behaviour every engine must share, driven through the public API only.

use evictkit::builder::{Cache, CacheBuilder, CachePolicy};
use evictkit::traits::CoreCache;

fn all_policies() -> Vec<CachePolicy> {
    vec![
        CachePolicy::Lru,
        CachePolicy::LruK {
            history_capacity: 16,
            k: 2,
        },
        CachePolicy::ShardedLru { shards: 4 },
        CachePolicy::Lfu,
        CachePolicy::aging_lfu(),
        CachePolicy::AgingLfu { max_average: 1 },
    ]
}

// ==============================================
// Capacity-0 Behavior
// ==============================================
//
// Zero capacity is a valid, inert cache: every put is dropped and every get
// misses.

mod zero_capacity {
    use super::*;

    #[test]
    fn every_policy_ignores_puts() {
        for policy in all_policies() {
            let cache: Cache<&str, i32> = CacheBuilder::new(0).build(policy);
            for _ in 0..3 {
                cache.put("key", 42);
            }
            assert_eq!(cache.get(&"key"), None, "{}", policy.name());
            assert_eq!(cache.len(), 0, "{}", policy.name());
            assert_eq!(cache.capacity(), 0, "{}", policy.name());
            assert_eq!(cache.get_or_default(&"key"), 0);
        }
    }
}

// ==============================================
// Capacity Invariant
// ==============================================

mod capacity {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_len_never_exceeds_capacity(
            capacity in 1usize..24,
            ops in prop::collection::vec((any::<bool>(), 0u16..64), 0..300)
        ) {
            for policy in all_policies() {
                let cache: Cache<u16, u16> = CacheBuilder::new(capacity).build(policy);
                for &(is_put, key) in &ops {
                    if is_put {
                        cache.put(key, key);
                    } else {
                        cache.get(&key);
                    }
                    prop_assert!(cache.len() <= cache.capacity());
                }
                prop_assert!(cache.check_invariants().is_ok(), "{}", policy.name());
            }
        }

        #[test]
        fn prop_get_never_changes_resident_set(
            capacity in 1usize..16,
            keys in prop::collection::vec(0u16..32, 1..64),
            probes in prop::collection::vec(0u16..32, 1..64)
        ) {
            for policy in all_policies() {
                let cache: Cache<u16, u16> = CacheBuilder::new(capacity).build(policy);
                for &key in &keys {
                    cache.put(key, key);
                }
                let resident: Vec<bool> = (0..32).map(|k| cache.contains(&k)).collect();
                for probe in &probes {
                    cache.get(probe);
                }
                let after: Vec<bool> = (0..32).map(|k| cache.contains(&k)).collect();
                prop_assert_eq!(&resident, &after, "{}", policy.name());
            }
        }
    }
}

// ==============================================
// Reference Scenarios
// ==============================================

mod scenarios {
    use super::*;

    #[test]
    fn lru_evicts_least_recent() {
        let cache = CacheBuilder::new(2).build::<i32, &str>(CachePolicy::Lru);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);
        cache.put(3, "c");

        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.get(&3), Some("c"));
    }

    #[test]
    fn lfu_evicts_least_frequent() {
        for policy in [CachePolicy::Lfu, CachePolicy::aging_lfu()] {
            let cache = CacheBuilder::new(2).build::<i32, &str>(policy);
            cache.put(1, "a");
            cache.put(2, "b");
            cache.get(&1);
            cache.put(3, "c");

            assert_eq!(cache.get(&2), None, "{}", policy.name());
            assert_eq!(cache.get(&1), Some("a"));
            assert_eq!(cache.get(&3), Some("c"));
        }
    }

    #[test]
    fn lru_recency_older_goes_first() {
        let cache = CacheBuilder::new(4).build::<u32, u32>(CachePolicy::Lru);
        cache.put(100, 0);
        cache.put(200, 0);
        cache.get(&100);
        cache.get(&200);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        assert!(!cache.contains(&100));
        assert!(cache.contains(&200));
    }

    #[test]
    fn lfu_equal_frequency_breaks_tie_by_recency() {
        let cache = CacheBuilder::new(2).build::<u32, u32>(CachePolicy::Lfu);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.get(&2);
        cache.get(&1);
        cache.put(3, 3);
        assert!(!cache.contains(&2));
        assert!(cache.contains(&1));
    }

    #[test]
    fn lru_k_admits_on_kth_access() {
        let cache = CacheBuilder::new(4).build::<u32, u32>(CachePolicy::LruK {
            history_capacity: 8,
            k: 3,
        });
        cache.put(1, 1);
        cache.put(1, 1);
        assert!(!cache.contains(&1));
        cache.put(1, 1);
        assert!(cache.contains(&1));
        for _ in 0..10 {
            assert_eq!(cache.get(&1), Some(1));
        }
    }
}

// ==============================================
// Overwrite Semantics
// ==============================================
//
// Overwriting a resident key never changes the resident count.

mod overwrite {
    use super::*;

    #[test]
    fn overwrite_keeps_len() {
        for policy in all_policies() {
            let cache: Cache<u8, u32> = CacheBuilder::new(3).build(policy);
            for round in 0..5 {
                for key in 0..3u8 {
                    cache.put(key, round);
                }
            }
            assert_eq!(cache.len(), 3, "{}", policy.name());
            assert_eq!(cache.get(&0), Some(4), "{}", policy.name());
        }
    }
}
