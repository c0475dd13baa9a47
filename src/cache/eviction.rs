//! Eviction Module
//!
//! Replacement scoring and the survival ordering walked by the cache when it
//! exceeds its byte budget.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::Tracking;

/// Default staleness window for [`EvictionScoring::DecayedRate`].
pub const DEFAULT_DECAY_WINDOW: Duration = Duration::from_secs(3600);

// == Eviction Scoring ==
/// How candidates are ranked for survival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionScoring {
    /// Hit count only. Equal counts fall back to key order.
    #[default]
    HitCount,
    /// Hit count discounted by time since last access, so a stale
    /// high-hit entry can rank below fresh lower-hit entries.
    DecayedRate { window: Duration },
}

impl EvictionScoring {
    /// Decayed scoring with the default window.
    pub fn decayed() -> Self {
        Self::DecayedRate {
            window: DEFAULT_DECAY_WINDOW,
        }
    }

    // == Compare ==
    /// Orders two candidates by survival priority, highest first.
    ///
    /// Total for any input: the final tie-break is the key itself.
    fn compare(
        &self,
        (a_key, a): (&str, &Tracking),
        (b_key, b): (&str, &Tracking),
        now: DateTime<Utc>,
    ) -> Ordering {
        let primary = match self {
            Self::HitCount => b.hits.cmp(&a.hits),
            Self::DecayedRate { window } => b
                .rate(now, *window)
                .total_cmp(&a.rate(now, *window))
                .then_with(|| b.last_accessed.cmp(&a.last_accessed)),
        };
        primary.then_with(|| a_key.cmp(b_key))
    }
}

impl fmt::Display for EvictionScoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HitCount => write!(f, "hits"),
            Self::DecayedRate { window } => write!(f, "decayed({}s)", window.as_secs()),
        }
    }
}

impl FromStr for EvictionScoring {
    type Err = String;

    /// Parses `hits` or `decayed`. The decay window takes its default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hits" | "hit_count" => Ok(Self::HitCount),
            "decayed" | "decayed_rate" | "rate" => Ok(Self::decayed()),
            other => Err(format!("unknown eviction scoring '{}'", other)),
        }
    }
}

// == Survival Order ==
/// Returns every tracked key except `protected`, best survivor first.
///
/// The eviction walk consumes this from the back.
pub fn survival_order(
    tracking: &HashMap<String, Tracking>,
    protected: &str,
    scoring: EvictionScoring,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut candidates: Vec<(&str, &Tracking)> = tracking
        .iter()
        .filter(|(key, _)| key.as_str() != protected)
        .map(|(key, record)| (key.as_str(), record))
        .collect();

    candidates.sort_by(|a, b| scoring.compare(*a, *b, now));

    candidates
        .into_iter()
        .map(|(key, _)| key.to_string())
        .collect()
}
