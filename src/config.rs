//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::cache::{EvictionScoring, DEFAULT_DECAY_WINDOW};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Byte budget for the cache
    pub capacity_bytes: u64,
    /// Replacement scoring used by the eviction walk
    pub scoring: EvictionScoring,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY_BYTES` - Byte budget (default: 200000000)
    /// - `CACHE_EVICTION_SCORING` - `hits` or `decayed` (default: hits)
    /// - `CACHE_DECAY_WINDOW_SECS` - Staleness window for `decayed` (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let capacity_bytes = env::var("CACHE_CAPACITY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.capacity_bytes);

        let scoring = match env::var("CACHE_EVICTION_SCORING") {
            Ok(raw) => raw.parse().unwrap_or_else(|err| {
                warn!("{}, falling back to {}", err, defaults.scoring);
                defaults.scoring
            }),
            Err(_) => defaults.scoring,
        };

        let scoring = match scoring {
            EvictionScoring::DecayedRate { .. } => EvictionScoring::DecayedRate {
                window: env::var("CACHE_DECAY_WINDOW_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_DECAY_WINDOW),
            },
            other => other,
        };

        Self {
            capacity_bytes,
            scoring,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity_bytes: 200_000_000,
            scoring: EvictionScoring::HitCount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 3] = [
        "CACHE_CAPACITY_BYTES",
        "CACHE_EVICTION_SCORING",
        "CACHE_DECAY_WINDOW_SECS",
    ];

    // Env vars are process-wide, so every case runs in one test.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }
        assert_eq!(Config::from_env(), Config::default());

        env::set_var("CACHE_CAPACITY_BYTES", "750000");
        env::set_var("CACHE_EVICTION_SCORING", "decayed");
        env::set_var("CACHE_DECAY_WINDOW_SECS", "60");
        let config = Config::from_env();
        assert_eq!(config.capacity_bytes, 750_000);
        assert_eq!(
            config.scoring,
            EvictionScoring::DecayedRate {
                window: Duration::from_secs(60)
            }
        );

        env::set_var("CACHE_CAPACITY_BYTES", "not-a-number");
        env::set_var("CACHE_EVICTION_SCORING", "lru");
        let config = Config::from_env();
        assert_eq!(config, Config::default());

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity_bytes, 200_000_000);
        assert_eq!(config.scoring, EvictionScoring::HitCount);
    }
}
