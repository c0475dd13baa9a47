//! Cache Store Module
//!
//! Main cache engine: value storage, per-key tracking and the running byte
//! total, all behind one lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::cache::{
    survival_order, CacheStats, EvictionScoring, SerializedSize, SizeEstimator, Tracking,
    MIN_CAPACITY,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Inner State ==
/// Everything guarded by the cache lock.
///
/// Invariants: `items` and `tracking` share a key set, and `used` equals the
/// sum of `tracking` costs. `used` is wider than a single cost so an
/// oversized put can never wrap it.
pub(super) struct Inner<V> {
    pub(super) items: HashMap<String, Arc<V>>,
    pub(super) tracking: HashMap<String, Tracking>,
    pub(super) used: u128,
    stats: CacheStats,
}

impl<V> Inner<V> {
    fn new(capacity: u64) -> Self {
        Self {
            items: HashMap::new(),
            tracking: HashMap::new(),
            used: 0,
            stats: CacheStats::new(capacity),
        }
    }

    /// Drops a key from both maps and releases its cost.
    fn remove(&mut self, key: &str) -> Option<Arc<V>> {
        let value = self.items.remove(key);
        if let Some(record) = self.tracking.remove(key) {
            self.used -= u128::from(record.cost);
        }
        value
    }

    /// `used` as reported to callers. Outside a put it never exceeds `u64::MAX`.
    fn used_bytes(&self) -> u64 {
        u64::try_from(self.used).unwrap_or(u64::MAX)
    }
}

// == Frequency Cache ==
/// Byte-bounded cache that evicts the least frequently used entries.
///
/// All operations are synchronous. `get`, `put` and `forget` take the write
/// lock because each of them mutates tracking.
pub struct FrequencyCache<V> {
    pub(super) inner: RwLock<Inner<V>>,
    capacity: u64,
    scoring: EvictionScoring,
    estimator: Box<dyn SizeEstimator<V>>,
}

impl<V: Serialize> FrequencyCache<V> {
    // == Constructor ==
    /// Creates a cache sized by [`SerializedSize`].
    ///
    /// # Panics
    /// If `capacity` is below [`MIN_CAPACITY`]. Use [`FrequencyCache::try_new`]
    /// when the capacity comes from untrusted input.
    pub fn new(capacity: u64) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a cache sized by [`SerializedSize`], rejecting small capacities.
    pub fn try_new(capacity: u64) -> Result<Self> {
        Self::with_estimator(capacity, SerializedSize)
    }

    /// Creates a cache from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::try_new(config.capacity_bytes)?.with_scoring(config.scoring))
    }
}

impl<V> FrequencyCache<V> {
    /// Creates a cache with a custom size estimator.
    ///
    /// # Arguments
    /// * `capacity` - Byte budget, at least [`MIN_CAPACITY`]
    /// * `estimator` - Cost function applied on every `put`
    pub fn with_estimator<E>(capacity: u64, estimator: E) -> Result<Self>
    where
        E: SizeEstimator<V> + 'static,
    {
        if capacity < MIN_CAPACITY {
            return Err(CacheError::CapacityTooSmall {
                capacity,
                minimum: MIN_CAPACITY,
            });
        }

        info!(capacity, "Frequency cache initialized");

        Ok(Self {
            inner: RwLock::new(Inner::new(capacity)),
            capacity,
            scoring: EvictionScoring::default(),
            estimator: Box::new(estimator),
        })
    }

    /// Replaces the eviction scoring.
    pub fn with_scoring(mut self, scoring: EvictionScoring) -> Self {
        self.scoring = scoring;
        self
    }

    // == Put ==
    /// Stores a value, measuring its cost with the configured estimator.
    ///
    /// Overwriting a key keeps its hit count. If the byte budget is exceeded
    /// afterwards, other entries are evicted; the key just written never is.
    ///
    /// Returns `Ok(true)` once stored.
    pub fn put(&self, key: impl Into<String>, value: V) -> Result<bool> {
        let key = key.into();
        validate_key(&key)?;

        let cost = self
            .estimator
            .estimate(&key, &value)
            .map_err(|source| CacheError::SizingFailed {
                key: key.clone(),
                source,
            })?;

        self.store(key, value, cost);
        Ok(true)
    }

    /// Stores a value with a caller-supplied cost, bypassing the estimator.
    pub fn put_with_cost(&self, key: impl Into<String>, value: V, cost: u64) -> Result<bool> {
        let key = key.into();
        validate_key(&key)?;

        self.store(key, value, cost);
        Ok(true)
    }

    fn store(&self, key: String, value: V, cost: u64) {
        let now = Utc::now();
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        inner.items.insert(key.clone(), Arc::new(value));

        match inner.tracking.get_mut(&key) {
            Some(record) => {
                let previous = record.refresh(cost, now);
                inner.used = inner.used - u128::from(previous) + u128::from(cost);
            }
            None => {
                inner.tracking.insert(key.clone(), Tracking::new(cost, now));
                inner.used += u128::from(cost);
            }
        }

        debug!(key = %key, cost, used = inner.used_bytes(), capacity = self.capacity, "Stored entry");

        if inner.used > u128::from(self.capacity) {
            let evicted = self.reduce(inner, &key, now);
            debug!(evicted, used = inner.used_bytes(), "Reduced cache to budget");
        }
    }

    // == Reduce ==
    /// Evicts entries, worst survivor first, until back under budget.
    ///
    /// `protected` is never a candidate, so the walk may end over budget.
    fn reduce(&self, inner: &mut Inner<V>, protected: &str, now: DateTime<Utc>) -> usize {
        let order = survival_order(&inner.tracking, protected, self.scoring, now);
        let mut evicted = 0;

        for key in order.into_iter().rev() {
            if inner.used <= u128::from(self.capacity) {
                break;
            }
            inner.remove(&key);
            inner.stats.record_eviction();
            evicted += 1;
            debug!(key = %key, used = inner.used_bytes(), "Evicted entry");
        }

        if inner.used > u128::from(self.capacity) {
            warn!(
                key = %protected,
                used = inner.used_bytes(),
                capacity = self.capacity,
                "Entry alone exceeds cache capacity"
            );
        }

        evicted
    }

    // == Get ==
    /// Retrieves a value and records a hit.
    ///
    /// Misses return [`CacheError::NotFound`] and leave tracking untouched.
    pub fn get(&self, key: &str) -> Result<Arc<V>> {
        let now = Utc::now();
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        match inner.items.get(key) {
            Some(value) => {
                let value = Arc::clone(value);
                if let Some(record) = inner.tracking.get_mut(key) {
                    record.touch(now);
                }
                inner.stats.record_hit();
                trace!(key, "Cache hit");
                Ok(value)
            }
            None => {
                inner.stats.record_miss();
                trace!(key, "Cache miss");
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Forget ==
    /// Removes an entry and releases its cost.
    ///
    /// Absent keys are not an error; forgetting twice succeeds twice.
    pub fn forget(&self, key: &str) -> Result<()> {
        let removed = self.inner.write().remove(key);
        if removed.is_some() {
            debug!(key, "Forgot entry");
        }
        Ok(())
    }

    // == Tracking ==
    /// Returns a copy of the tracking record for `key`.
    pub fn tracking(&self, key: &str) -> Option<Tracking> {
        self.inner.read().tracking.get(key).cloned()
    }

    // == Used ==
    /// Current sum of tracked costs.
    pub fn used(&self) -> u64 {
        self.inner.read().used_bytes()
    }

    // == Capacity ==
    /// Configured byte budget.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    // == Scoring ==
    /// Returns the replacement scoring used by the eviction walk.
    pub fn scoring(&self) -> EvictionScoring {
        self.scoring
    }

    // == Contains ==
    /// Checks if a key is stored, without recording a hit.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().items.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        let mut stats = inner.stats.clone();
        stats.entries = inner.items.len();
        stats.used_bytes = inner.used_bytes();
        stats
    }
}

impl<V> fmt::Debug for FrequencyCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("FrequencyCache")
            .field("capacity", &self.capacity)
            .field("used", &inner.used_bytes())
            .field("entries", &inner.items.len())
            .field("scoring", &self.scoring)
            .finish()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}
