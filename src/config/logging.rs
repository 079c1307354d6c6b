//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Diagnostic logging settings
///
/// Logging is off unless enabled; the engine's events are discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    /// `tracing` filter directive
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.filter.trim().is_empty() {
            return Err(ValidationError::EmptyLogFilter);
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "chatflow=debug".to_string()
}
