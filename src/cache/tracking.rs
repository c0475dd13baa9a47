//! Tracking Module
//!
//! Per-key metadata consulted by the eviction walk: byte cost, hit count and
//! last access time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Tracking ==
/// Metadata kept alongside every stored value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tracking {
    /// Byte cost attributed to the key when it was last written
    pub cost: u64,
    /// Number of successful `get` calls
    pub hits: u64,
    /// Last `get` or `put` on the key
    pub last_accessed: DateTime<Utc>,
}

impl Tracking {
    // == Constructor ==
    /// Creates a record for a freshly inserted key.
    pub fn new(cost: u64, now: DateTime<Utc>) -> Self {
        Self {
            cost,
            hits: 0,
            last_accessed: now,
        }
    }

    // == Touch ==
    /// Records a hit.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.hits = self.hits.saturating_add(1);
        self.last_accessed = now;
    }

    // == Refresh ==
    /// Records an overwrite. The hit count survives; cost and access time do not.
    ///
    /// Returns the previous cost so the caller can adjust its running total.
    pub fn refresh(&mut self, cost: u64, now: DateTime<Utc>) -> u64 {
        self.last_accessed = now;
        std::mem::replace(&mut self.cost, cost)
    }

    // == Age ==
    /// Time since last access. Clock skew into the future counts as zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_accessed).to_std().unwrap_or(Duration::ZERO)
    }

    // == Rate ==
    /// Hits discounted by staleness: `hits / (1 + age / window)`.
    ///
    /// A zero window disables the discount.
    pub fn rate(&self, now: DateTime<Utc>, window: Duration) -> f64 {
        let hits = self.hits as f64;
        if window.is_zero() {
            return hits;
        }
        hits / (1.0 + self.age(now).as_secs_f64() / window.as_secs_f64())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_tracking_new() {
        let now = Utc::now();
        let tracking = Tracking::new(16, now);

        assert_eq!(tracking.cost, 16);
        assert_eq!(tracking.hits, 0);
        assert_eq!(tracking.last_accessed, now);
    }

    #[test]
    fn test_touch_increments_hits() {
        let now = Utc::now();
        let later = now + ChronoDuration::seconds(5);
        let mut tracking = Tracking::new(16, now);

        tracking.touch(later);
        tracking.touch(later);

        assert_eq!(tracking.hits, 2);
        assert_eq!(tracking.last_accessed, later);
    }

    #[test]
    fn test_refresh_preserves_hits() {
        let now = Utc::now();
        let later = now + ChronoDuration::seconds(5);
        let mut tracking = Tracking::new(16, now);
        tracking.touch(now);

        let previous = tracking.refresh(40, later);

        assert_eq!(previous, 16);
        assert_eq!(tracking.cost, 40);
        assert_eq!(tracking.hits, 1);
        assert_eq!(tracking.last_accessed, later);
    }

    #[test]
    fn test_age_never_negative() {
        let now = Utc::now();
        let tracking = Tracking::new(1, now + ChronoDuration::seconds(30));

        assert_eq!(tracking.age(now), Duration::ZERO);
    }

    #[test]
    fn test_rate_decays_with_age() {
        let now = Utc::now();
        let window = Duration::from_secs(3600);

        let mut fresh = Tracking::new(1, now);
        fresh.hits = 100;
        let mut stale = Tracking::new(1, now - ChronoDuration::hours(1));
        stale.hits = 100;

        assert_eq!(fresh.rate(now, window), 100.0);
        assert_eq!(stale.rate(now, window), 50.0);
    }

    #[test]
    fn test_rate_zero_window_is_raw_hits() {
        let now = Utc::now();
        let mut tracking = Tracking::new(1, now - ChronoDuration::days(3));
        tracking.hits = 7;

        assert_eq!(tracking.rate(now, Duration::ZERO), 7.0);
    }
}
