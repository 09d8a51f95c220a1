//! Ledger configuration

use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use coffer_types::EconomyRules;
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path of the persisted account table
    pub data_file: PathBuf,
    /// Offset from UTC, in minutes, used to decide what "today" means for
    /// daily claims
    pub utc_offset_minutes: i32,
    /// Save attempts per flush before persistence is reported as degraded
    pub flush_attempts: u32,
    /// Delay before the first retry; later retries wait proportionally longer
    pub flush_backoff_ms: u64,
    /// Economy constants
    pub rules: EconomyRules,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/economy.json"),
            utc_offset_minutes: 0,
            flush_attempts: 3,
            flush_backoff_ms: 50,
            rules: EconomyRules::default(),
        }
    }
}

impl LedgerConfig {
    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_file: std::env::var("COFFER_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            utc_offset_minutes: env_parse("COFFER_UTC_OFFSET_MINUTES")
                .unwrap_or(defaults.utc_offset_minutes),
            flush_attempts: env_parse("COFFER_FLUSH_ATTEMPTS").unwrap_or(defaults.flush_attempts),
            flush_backoff_ms: env_parse("COFFER_FLUSH_BACKOFF_MS")
                .unwrap_or(defaults.flush_backoff_ms),
            rules: defaults.rules,
        }
    }

    /// Calendar offset for daily claims. Out-of-range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Ignoring out-of-range UTC offset of {} minutes",
                    self.utc_offset_minutes
                );
                Utc.fix()
            })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
