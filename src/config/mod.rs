//! Engine configuration.
//!
//! Settings come from `CHATFLOW__*` environment variables (optionally seeded
//! from a `.env` file) and deserialize into one typed struct per section.
//! Every value has a default, so an empty environment loads.
//!
//! # Example
//!
//! ```no_run
//! use chatflow::config::AppConfig;
//!
//! let config = AppConfig::load_validated().expect("bad configuration");
//!
//! println!("Engine {} renders {}", config.engine.name, config.engine.parse_mode);
//! ```

mod dispatch;
mod engine;
mod error;
mod logging;
mod sessions;

pub use dispatch::DispatchConfig;
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use sessions::SessionsConfig;

use serde::Deserialize;

/// All configuration sections. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Workflow controller settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Idle-session eviction
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Message pump limits
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Diagnostic logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads `CHATFLOW`-prefixed variables, `__` separating nesting levels.
    ///
    /// - `CHATFLOW__ENGINE__PARSE_MODE=markdown_v2` -> `engine.parse_mode`
    /// - `CHATFLOW__SESSIONS__IDLE_TTL_SECS=900` -> `sessions.idle_ttl_secs`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is fine.
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHATFLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one go.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks each section in turn and reports the first bad value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.sessions.validate()?;
        self.dispatch.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
