//! Engine configuration.

use std::time::Duration;

const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 3_000;

/// Runtime configuration for the tournament engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on matchmaking oracle calls before falling back
    pub oracle_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oracle_timeout: Duration::from_millis(DEFAULT_ORACLE_TIMEOUT_MS),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the environment
    ///
    /// `RATING_ORACLE_TIMEOUT_MS` overrides the oracle timeout.
    pub fn from_env() -> Self {
        let timeout_ms = std::env::var("RATING_ORACLE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_ORACLE_TIMEOUT_MS);
        Self {
            oracle_timeout: Duration::from_millis(timeout_ms),
        }
    }
}
