//! Cache Module
//!
//! Provides a byte-bounded in-memory cache with frequency-weighted eviction.

mod eviction;
mod sizing;
mod stats;
mod store;
mod tracking;


// Re-export public types
pub use eviction::{survival_order, EvictionScoring, DEFAULT_DECAY_WINDOW};
pub use sizing::{FnEstimator, SerializedSize, SizeEstimator, SizingError};
pub use stats::CacheStats;
pub use store::FrequencyCache;
pub use tracking::Tracking;

// == Public Constants ==
/// Smallest byte budget a cache may be constructed with
pub const MIN_CAPACITY: u64 = 500_000;
