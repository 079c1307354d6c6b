//! Message pump configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Dispatcher limits
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Turns allowed to run at once across all users
    #[serde(default = "default_max_concurrent_turns")]
    pub max_concurrent_turns: usize,

    /// Capacity of the inbound message channel
    #[serde(default = "default_inbound_buffer")]
    pub inbound_buffer: usize,

    /// Messages one user may have queued before the dispatcher stops
    /// reading inbound
    #[serde(default = "default_user_queue")]
    pub user_queue: usize,
}

impl DispatchConfig {
    /// Validate dispatcher configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrent_turns == 0 {
            return Err(ValidationError::InvalidConcurrency);
        }
        if self.inbound_buffer == 0 {
            return Err(ValidationError::InvalidInboundBuffer);
        }
        if self.user_queue == 0 {
            return Err(ValidationError::InvalidUserQueue);
        }
        Ok(())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_turns: default_max_concurrent_turns(),
            inbound_buffer: default_inbound_buffer(),
            user_queue: default_user_queue(),
        }
    }
}

fn default_max_concurrent_turns() -> usize {
    64
}

fn default_inbound_buffer() -> usize {
    256
}

fn default_user_queue() -> usize {
    16
}
