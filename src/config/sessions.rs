//! Session lifetime configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Idle-session eviction settings
///
/// Without `idle_ttl_secs` sessions are never evicted and an abandoned
/// workflow stays in memory until the process exits.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Evict sessions idle for longer than this many seconds
    pub idle_ttl_secs: Option<u64>,

    /// How often the reaper looks for idle sessions
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl SessionsConfig {
    /// Idle TTL as a duration, if eviction is enabled
    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl_secs.map(Duration::from_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.idle_ttl_secs == Some(0) {
            return Err(ValidationError::InvalidIdleTtl);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: None,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}
