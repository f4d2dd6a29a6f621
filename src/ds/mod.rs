pub mod frequency_buckets;
pub mod intrusive_list;
pub mod shard;

pub use frequency_buckets::FrequencyBuckets;
pub use intrusive_list::{ListArena, ListId, ListIter, SlotId};
pub use shard::ShardSelector;
