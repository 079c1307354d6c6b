//! Configuration errors.

use thiserror::Error;

/// Failure to load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A configuration value that parsed but makes no sense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Engine name must not be empty")]
    EmptyEngineName,

    #[error("Session idle TTL must be greater than zero")]
    InvalidIdleTtl,

    #[error("Session sweep interval must be greater than zero")]
    InvalidSweepInterval,

    #[error("Max concurrent turns must be greater than zero")]
    InvalidConcurrency,

    #[error("Inbound buffer must be greater than zero")]
    InvalidInboundBuffer,

    #[error("Per-user queue must be greater than zero")]
    InvalidUserQueue,

    #[error("Log filter must not be empty when logging is enabled")]
    EmptyLogFilter,
}
