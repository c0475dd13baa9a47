//! Sizing Module
//!
//! Assigns a byte cost to each cache entry. The cache enforces
//! `sum(cost) <= capacity`, so the estimator decides what "a byte" means.

use serde::Serialize;
use thiserror::Error;

// == Sizing Error ==
/// Failure reported by a [`SizeEstimator`].
#[derive(Error, Debug)]
pub enum SizingError {
    /// The value could not be serialized
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    /// Estimator-specific failure
    #[error("{0}")]
    Other(String),
}

impl SizingError {
    /// Creates an estimator-specific error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

// == Size Estimator ==
/// Computes the byte cost of one cache entry.
///
/// Called synchronously on every `put`, outside the cache lock. Implementations
/// must not observe or mutate the cache.
pub trait SizeEstimator<V>: Send + Sync {
    fn estimate(&self, key: &str, value: &V) -> Result<u64, SizingError>;
}

// == Serialized Size ==
/// Cost = key length + length of the value's JSON encoding.
///
/// This is the default estimator for `Serialize` values. Encoding failures
/// (e.g. maps with non-string keys) surface as [`SizingError::Serialize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializedSize;

impl<V: Serialize> SizeEstimator<V> for SerializedSize {
    fn estimate(&self, key: &str, value: &V) -> Result<u64, SizingError> {
        let encoded = serde_json::to_vec(value)?;
        Ok((key.len() + encoded.len()) as u64)
    }
}

// == Closure Estimator ==
/// An infallible estimator backed by a closure.
///
/// ```
/// use lfu_cache::cache::{FnEstimator, FrequencyCache};
///
/// let cache: FrequencyCache<Vec<u8>> = FrequencyCache::with_estimator(
///     1_000_000,
///     FnEstimator(|key: &str, value: &Vec<u8>| (key.len() + value.len()) as u64),
/// )
/// .unwrap();
/// assert!(cache.is_empty());
/// ```
pub struct FnEstimator<F>(pub F);

impl<V, F> SizeEstimator<V> for FnEstimator<F>
where
    F: Fn(&str, &V) -> u64 + Send + Sync,
{
    fn estimate(&self, key: &str, value: &V) -> Result<u64, SizingError> {
        Ok((self.0)(key, value))
    }
}
