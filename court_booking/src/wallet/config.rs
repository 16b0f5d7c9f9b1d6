//! Top-up limits.

use std::env;

/// Per-transaction and per-day deposit limits, in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopUpLimits {
    /// Smallest accepted top-up
    pub min_cents: i64,
    /// Largest accepted top-up
    pub max_cents: i64,
    /// Total a user may deposit per UTC day
    pub daily_limit_cents: i64,
}

impl Default for TopUpLimits {
    /// $10 minimum, $10,000 maximum, $50,000 per day
    fn default() -> Self {
        Self {
            min_cents: 1_000,
            max_cents: 1_000_000,
            daily_limit_cents: 5_000_000,
        }
    }
}

impl TopUpLimits {
    /// Create limits from environment variables
    ///
    /// Expected environment variables:
    /// - `TOPUP_MIN_CENTS` (default: 1000)
    /// - `TOPUP_MAX_CENTS` (default: 1000000)
    /// - `TOPUP_DAILY_LIMIT_CENTS` (default: 5000000)
    ///
    /// Unset or unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_cents: env_cents("TOPUP_MIN_CENTS", defaults.min_cents),
            max_cents: env_cents("TOPUP_MAX_CENTS", defaults.max_cents),
            daily_limit_cents: env_cents("TOPUP_DAILY_LIMIT_CENTS", defaults.daily_limit_cents),
        }
    }

    /// Whether the limits describe a usable range
    pub fn is_consistent(&self) -> bool {
        self.min_cents > 0
            && self.min_cents <= self.max_cents
            && self.max_cents <= self.daily_limit_cents
    }
}

fn env_cents(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
