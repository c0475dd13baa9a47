//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::cache::SizingError;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key rejected before it reached the store
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Capacity below the fixed minimum
    #[error("Cache capacity {capacity} is below the minimum of {minimum} bytes")]
    CapacityTooSmall { capacity: u64, minimum: u64 },

    /// The size estimator could not measure a value
    #[error("Sizing failed for key '{key}': {source}")]
    SizingFailed {
        key: String,
        #[source]
        source: SizingError,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
