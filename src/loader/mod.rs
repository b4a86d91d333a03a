//! Progressive image loading
//!
//! - **priority**: position-derived priorities
//! - **queue**: bounded-concurrency admission and per-image status
//! - **worker**: single fetch + decode attempts
//! - **scheduler**: timer-driven async driver tying the above together

mod priority;
mod queue;
mod scheduler;
mod worker;

pub use priority::{EAGER_BAND, LOWEST_PRIORITY, Priority};
pub use queue::{LoadQueue, LoadRequest, LoadState, LoadStatus, QueueStats};
pub use scheduler::{ChangeNotifier, LoadScheduler};
pub use worker::{
    DecodedImage, DefaultFetcher, FetchWorker, FileFetcher, HttpFetcher, ImageFetcher, Liveness,
    LoadOutcome, attempt,
};

#[cfg(test)]
pub(crate) use worker::MockImageFetcher;

use crate::utils::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default concurrency budget
pub const DEFAULT_MAX_CONCURRENT: usize = 4;
/// Default admission cadence in milliseconds
pub const DEFAULT_TICK_MS: u64 = 100;
/// Default per-attempt fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Loader tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Maximum simultaneous fetches
    pub max_concurrent: usize,
    /// Admission cadence
    pub tick_interval_ms: u64,
    /// Upper bound for a single fetch attempt
    pub fetch_timeout_secs: u64,
}

impl LoaderConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Reject values the scheduler cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(invalid("max_concurrent", "must be at least 1"));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be at least 1"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(invalid("fetch_timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            tick_interval_ms: DEFAULT_TICK_MS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::utils::VistaError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let config = LoaderConfig {
            max_concurrent: 0,
            ..LoaderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LoaderConfig = serde_json::from_str(r#"{"max_concurrent": 8}"#).unwrap();
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_MS);
    }
}
