pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::CacheMetricsSnapshot;
pub use crate::policy::aging_lfu::{AgingLfuCache, AgingLfuCore, DEFAULT_MAX_AVERAGE};
pub use crate::policy::lfu::{LfuCache, LfuCore};
pub use crate::policy::lru::{LruCache, LruCore};
pub use crate::policy::lru_k::LruKCache;
pub use crate::policy::sharded_lru::ShardedLruCache;
pub use crate::traits::{ConcurrentCache, CoreCache, MutableCache};
