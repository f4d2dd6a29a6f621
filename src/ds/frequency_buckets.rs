//! Frequency buckets for O(1) LFU tracking.
//!
//! [`FrequencyBuckets`] is the shared machinery behind both LFU engines: a
//! key index, one circular list per frequency value, and the minimum live
//! frequency. Every node sits in exactly one bucket; within a bucket the
//! front is the most recently promoted node and the back is the eviction
//! candidate, so frequency is the primary eviction key and recency the
//! tie-break.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>          nodes: ListArena<Entry<K, V>>
//!   ┌──────────┬────────┐               ┌──────┬───────────────────────┐
//!   │ "page_a" │ id_0   │──────────────►│ id_0 │ key, value, freq: 2   │
//!   │ "page_b" │ id_1   │──────────────►│ id_1 │ key, value, freq: 1   │
//!   │ "page_c" │ id_2   │──────────────►│ id_2 │ key, value, freq: 1   │
//!   └──────────┴────────┘               └──────┴───────────────────────┘
//!
//!   buckets: FxHashMap<u64, ListId>      min_freq = 1, total_freq = 4
//!
//!   freq=1: [s1] ──► [id_2] ──► [id_1] ──┐   (id_1 is evicted first)
//!             ▲                          │
//!             └──────────────────────────┘
//!   freq=2: [s2] ──► [id_0] ──┐
//!             ▲               │
//!             └───────────────┘
//! ```
//!
//! Buckets are created on first use and never deleted; an empty bucket is
//! just a self-linked sentinel and gets reused when a node reaches that
//! frequency again.
//!
//! ## Operations
//!
//! | Operation      | Time   | Notes                                         |
//! |----------------|--------|-----------------------------------------------|
//! | `insert_new`   | O(1)   | New key at freq 1, `min_freq` reset to 1      |
//! | `touch`        | O(1)   | Promote to the front of bucket `freq + 1`     |
//! | `evict_min`    | O(1)   | Back of bucket `min_freq`                     |
//! | `rebuild_with` | O(n)*  | Re-bucket every node with a new frequency     |
//! | `age_by`       | O(n)*  | `rebuild_with(f - delta, clamped to 1)`       |
//!
//! \* plus sorting the distinct live frequencies; empty buckets are skipped.
//!
//! ## Example
//!
//! ```
//! use evictkit::ds::FrequencyBuckets;
//!
//! let mut freq = FrequencyBuckets::new(8);
//! freq.insert_new("a", 1);
//! freq.insert_new("b", 2);
//! freq.touch(&"a");
//!
//! assert_eq!(freq.frequency(&"a"), Some(2));
//! assert_eq!(freq.min_freq(), 1);
//! assert_eq!(freq.evict_min(), Some(("b", 2, 1)));
//! ```

use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ds::intrusive_list::{ListArena, ListId, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    freq: u64,
}

/// Key index plus per-frequency circular lists with a tracked minimum.
#[derive(Debug)]
pub struct FrequencyBuckets<K, V> {
    nodes: ListArena<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, ListId>,
    min_freq: u64,
    total_freq: u64,
}

impl<K, V> FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates empty buckets sized for `capacity` resident keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: ListArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
            total_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Smallest frequency with a non-empty bucket; 0 when empty.
    pub fn min_freq(&self) -> u64 {
        self.min_freq
    }

    /// Sum of the frequencies of all resident keys.
    pub fn total_freq(&self) -> u64 {
        self.total_freq
    }

    /// Number of buckets ever created (empty ones included).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Current frequency of `key` without promoting it.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|entry| entry.freq)
    }

    /// Value of `key` without promoting it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|entry| &entry.value)
    }

    /// Value stored at a handle returned by [`touch`](Self::touch) or
    /// [`insert_new`](Self::insert_new).
    pub fn value(&self, id: SlotId) -> Option<&V> {
        self.nodes.get(id).map(|entry| &entry.value)
    }

    pub fn value_mut(&mut self, id: SlotId) -> Option<&mut V> {
        self.nodes.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Iterates `(key, value, frequency)` in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V, u64)> {
        self.index.values().filter_map(|&id| {
            self.nodes
                .get(id)
                .map(|entry| (&entry.key, &entry.value, entry.freq))
        })
    }

    fn bucket(&mut self, freq: u64) -> ListId {
        if let Some(&list) = self.buckets.get(&freq) {
            return list;
        }
        let list = self.nodes.new_list();
        self.buckets.insert(freq, list);
        list
    }

    /// Inserts an absent key at frequency 1 and resets `min_freq` to 1.
    ///
    /// The caller must have checked that `key` is not resident.
    pub fn insert_new(&mut self, key: K, value: V) -> SlotId {
        debug_assert!(!self.index.contains_key(&key));
        let list = self.bucket(1);
        let id = self.nodes.push_front(
            list,
            Entry {
                key: key.clone(),
                value,
                freq: 1,
            },
        );
        self.index.insert(key, id);
        self.min_freq = 1;
        self.total_freq = self.total_freq.saturating_add(1);
        id
    }

    /// Increments the frequency of `key` and moves it to the front of its
    /// new bucket. Returns the node handle, or `None` on a miss.
    pub fn touch(&mut self, key: &K) -> Option<SlotId> {
        let id = *self.index.get(key)?;
        let freq = self.nodes.get(id)?.freq;
        let new_freq = freq.saturating_add(1);
        if new_freq == freq {
            let list = self.bucket(freq);
            self.nodes.move_to_front(list, id);
            return Some(id);
        }

        // Leaving the minimum bucket empty: the node itself lands on freq + 1,
        // which becomes the new minimum.
        if freq == self.min_freq
            && let Some(&old) = self.buckets.get(&freq)
            && self.nodes.is_singleton(old)
        {
            self.min_freq = new_freq;
        }

        self.nodes.unlink(id);
        if let Some(entry) = self.nodes.get_mut(id) {
            entry.freq = new_freq;
        }
        let list = self.bucket(new_freq);
        self.nodes.link_front(list, id);
        self.total_freq = self.total_freq.saturating_add(1);
        Some(id)
    }

    /// Evicts the back node of the `min_freq` bucket.
    ///
    /// Returns `(key, value, frequency)` of the victim. `min_freq` is left
    /// as-is; the insert that follows an eviction resets it to 1.
    pub fn evict_min(&mut self) -> Option<(K, V, u64)> {
        let list = *self.buckets.get(&self.min_freq)?;
        let id = self.nodes.back(list)?;
        let entry = self.nodes.remove(id)?;
        self.index.remove(&entry.key);
        self.total_freq = self.total_freq.saturating_sub(entry.freq);
        if self.index.is_empty() {
            self.min_freq = 0;
        }
        Some((entry.key, entry.value, entry.freq))
    }

    /// Re-buckets every resident node under `f(old_freq)` (clamped to ≥ 1).
    ///
    /// Only buckets that currently hold a node are walked, so the pass costs
    /// O(n + d log d) for `n` residents spread over `d` distinct frequencies,
    /// however many empty buckets earlier promotions left behind. Nodes are
    /// visited from the lowest live bucket up, each bucket back to front, and
    /// relinked at the front of their new bucket: relative recency within a
    /// source bucket is preserved, and nodes coming from a higher source
    /// bucket end up in front of those from a lower one. `min_freq` and
    /// `total_freq` are recomputed from the result.
    ///
    /// Returns the number of source buckets walked.
    pub fn rebuild_with(&mut self, f: impl Fn(u64) -> u64) -> usize {
        if self.index.is_empty() {
            return 0;
        }

        let live: FxHashSet<u64> = self
            .index
            .values()
            .filter_map(|&id| self.nodes.get(id).map(|entry| entry.freq))
            .collect();
        let mut live: Vec<u64> = live.into_iter().collect();
        live.sort_unstable();

        let mut order = Vec::with_capacity(self.index.len());
        for freq in &live {
            if let Some(&list) = self.buckets.get(freq) {
                order.extend(self.nodes.iter(list).rev().map(|(id, _)| id));
            }
        }

        let mut min_freq = u64::MAX;
        let mut total_freq = 0u64;
        for id in order {
            let Some(old) = self.nodes.get(id).map(|entry| entry.freq) else {
                continue;
            };
            let new_freq = f(old).max(1);
            self.nodes.unlink(id);
            if let Some(entry) = self.nodes.get_mut(id) {
                entry.freq = new_freq;
            }
            let list = self.bucket(new_freq);
            self.nodes.link_front(list, id);
            min_freq = min_freq.min(new_freq);
            total_freq = total_freq.saturating_add(new_freq);
        }

        self.min_freq = min_freq;
        self.total_freq = total_freq;
        live.len()
    }

    /// Lowers every frequency by `delta`, never below 1.
    ///
    /// Returns the number of source buckets walked.
    pub fn age_by(&mut self, delta: u64) -> usize {
        self.rebuild_with(|freq| freq.saturating_sub(delta))
    }

    /// Drops every node and bucket.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
        self.total_freq = 0;
    }

    /// Verifies index/bucket consistency, `min_freq` and `total_freq`.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut linked = 0usize;
        let mut total = 0u64;
        let mut lowest_live: Option<u64> = None;

        for (&freq, &list) in &self.buckets {
            let count = self.nodes.check_list(list)?;
            for (id, entry) in self.nodes.iter(list) {
                if entry.freq != freq {
                    return Err(InvariantError::new(format!(
                        "bucket {freq} holds a node with frequency {}",
                        entry.freq
                    )));
                }
                if self.index.get(&entry.key) != Some(&id) {
                    return Err(InvariantError::new(format!(
                        "node {} in bucket {freq} is not indexed under its key",
                        id.index()
                    )));
                }
                total = total.saturating_add(entry.freq);
            }
            if count > 0 {
                lowest_live = Some(lowest_live.map_or(freq, |low| low.min(freq)));
            }
            linked += count;
        }

        if linked != self.index.len() || self.nodes.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys but {} nodes are linked ({} allocated)",
                self.index.len(),
                linked,
                self.nodes.len()
            )));
        }
        if total != self.total_freq {
            return Err(InvariantError::new(format!(
                "total frequency is {} but resident nodes sum to {total}",
                self.total_freq
            )));
        }
        match lowest_live {
            Some(low) if low != self.min_freq => Err(InvariantError::new(format!(
                "min_freq is {} but the lowest non-empty bucket is {low}",
                self.min_freq
            ))),
            None if self.min_freq != 0 => Err(InvariantError::new(format!(
                "min_freq is {} on an empty structure",
                self.min_freq
            ))),
            _ => Ok(()),
        }
    }
}
