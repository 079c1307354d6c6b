//! Engine configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::message::ParseMode;

/// Workflow controller settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Controller name, attached to every log event
    #[serde(default = "default_name")]
    pub name: String,

    /// Text-rendering hint passed to the transport (`html` or `markdown_v2`)
    #[serde(default)]
    pub parse_mode: ParseMode,
}

impl EngineConfig {
    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyEngineName);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            parse_mode: ParseMode::default(),
        }
    }
}

fn default_name() -> String {
    "chatflow".to_string()
}
