//! Engine configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the engine works with zero
//! configuration.

use murmur_shared::constants::{
    DEFAULT_EVENT_BUFFER, DEFAULT_LOG_FILTER, ENV_DAY_OFFSET_MINUTES, ENV_EVENT_BUFFER, ENV_LOG,
};
use murmur_shared::{DayRule, Result, SyncError};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Where day boundaries fall. Fixed for the registry's lifetime.
    /// Env: `MURMUR_DAY_OFFSET_MINUTES` (minutes east of UTC, or `local`)
    /// Default: UTC
    pub day_rule: DayRule,

    /// Capacity of the change-event broadcast channel.
    /// Env: `MURMUR_EVENT_BUFFER`
    /// Default: `256`
    pub event_buffer: usize,

    /// Tracing filter used when `RUST_LOG` is unset.
    /// Env: `MURMUR_LOG`
    pub log_filter: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            day_rule: DayRule::Utc,
            event_buffer: DEFAULT_EVENT_BUFFER,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`SyncConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DAY_OFFSET_MINUTES) {
            match parse_day_rule(&value) {
                Ok(rule) => config.day_rule = rule,
                Err(e) => {
                    tracing::warn!(
                        value = %value,
                        error = %e,
                        "Invalid {}, using UTC",
                        ENV_DAY_OFFSET_MINUTES
                    );
                }
            }
        }

        if let Some(value) = lookup(ENV_EVENT_BUFFER) {
            match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.event_buffer = n,
                _ => {
                    tracing::warn!(value = %value, "Invalid {}, using default", ENV_EVENT_BUFFER);
                }
            }
        }

        if let Some(filter) = lookup(ENV_LOG) {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }

        config
    }
}

/// Parse `local` or an integer number of minutes east of UTC.
fn parse_day_rule(value: &str) -> Result<DayRule> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("local") {
        return Ok(DayRule::local());
    }
    let minutes = value
        .parse::<i32>()
        .map_err(|e| SyncError::Config(format!("{ENV_DAY_OFFSET_MINUTES}: {e}")))?;
    DayRule::from_offset_minutes(minutes)
}
