//! LFU Cache - An in-process, byte-bounded key/value cache
//!
//! Evicts the least frequently used entries once the summed entry cost
//! exceeds the configured budget.
//!
//! ```
//! use lfu_cache::FrequencyCache;
//!
//! let cache = FrequencyCache::new(500_000);
//! cache.put("greeting", "hello".to_string()).unwrap();
//! assert_eq!(*cache.get("greeting").unwrap(), "hello");
//! cache.forget("greeting").unwrap();
//! assert!(cache.get("greeting").is_err());
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{EvictionScoring, FrequencyCache, MIN_CAPACITY};
pub use config::Config;
pub use error::{CacheError, Result};
