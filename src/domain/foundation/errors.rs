//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lifecycle errors
    InvalidStateTransition,

    // Workflow definition errors
    WorkflowMisconfigured,

    // Infrastructure errors
    SessionStoreError,
    TransportError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::WorkflowMisconfigured => "WORKFLOW_MISCONFIGURED",
            ErrorCode::SessionStoreError => "SESSION_STORE_ERROR",
            ErrorCode::TransportError => "TRANSPORT_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Domain error carrying a stable code plus free-form context.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Attaches a key/value pair for logs and callers.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_code_and_message() {
        let err = DomainError::new(ErrorCode::WorkflowMisconfigured, "No root step");
        assert_eq!(format!("{}", err), "[WORKFLOW_MISCONFIGURED] No root step");
    }

    #[test]
    fn details_accumulate() {
        let err = DomainError::new(ErrorCode::SessionStoreError, "store offline")
            .with_detail("user_id", "1234")
            .with_detail("operation", "put");

        assert_eq!(err.details.len(), 2);
        assert_eq!(err.details.get("operation").map(String::as_str), Some("put"));
    }

    #[test]
    fn codes_render_screaming_snake_case() {
        assert_eq!(ErrorCode::TransportError.to_string(), "TRANSPORT_ERROR");
        assert_eq!(
            ErrorCode::InvalidStateTransition.to_string(),
            "INVALID_STATE_TRANSITION"
        );
    }
}
