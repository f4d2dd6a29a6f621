//! Deterministic key streams for engine benchmarks.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use evictkit::traits::CoreCache;

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    /// Uniform random keys in `[0, universe)`.
    Uniform,
    /// `hot_keys` keys drawn with probability `hot_prob`, the rest of the
    /// universe otherwise.
    HotCold { hot_keys: u64, hot_prob: f64 },
    /// Sequential scan in `[0, universe)`.
    Scan,
}

#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    universe: u64,
    workload: Workload,
    rng: SmallRng,
    scan_pos: u64,
}

impl WorkloadGenerator {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        Self {
            universe: universe.max(1),
            workload,
            rng: SmallRng::seed_from_u64(seed),
            scan_pos: 0,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match self.workload {
            Workload::Uniform => self.rng.gen_range(0..self.universe),
            Workload::HotCold { hot_keys, hot_prob } => {
                let hot_keys = hot_keys.clamp(1, self.universe);
                if hot_keys == self.universe || self.rng.gen_bool(hot_prob.clamp(0.0, 1.0)) {
                    self.rng.gen_range(0..hot_keys)
                } else {
                    self.rng.gen_range(hot_keys..self.universe)
                }
            },
            Workload::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HitRate {
    pub hits: u64,
    pub misses: u64,
}

impl HitRate {
    pub fn hit_rate(self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Read-through replay: `get`, and `put` on a miss.
pub fn run_hit_rate<C>(cache: &C, generator: &mut WorkloadGenerator, operations: usize) -> HitRate
where
    C: CoreCache<u64, u64> + ?Sized,
{
    let mut rate = HitRate::default();
    for _ in 0..operations {
        let key = generator.next_key();
        if cache.get(&key).is_some() {
            rate.hits += 1;
        } else {
            rate.misses += 1;
            cache.put(key, key);
        }
    }
    rate
}
