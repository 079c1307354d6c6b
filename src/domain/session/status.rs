//! Session lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where a session is in its lifecycle.
///
/// Only `Active` sessions live in the store; every other status is terminal
/// and describes how the session left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    /// Reached a terminal step.
    Completed,
    /// User pressed the cancel button.
    Cancelled,
    /// Branch resolution failed.
    Aborted,
    /// Removed after sitting idle past the configured TTL.
    Evicted,
}

impl StateMachine for SessionStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Active => vec![Completed, Cancelled, Aborted, Evicted],
            Completed | Cancelled | Aborted | Evicted => vec![],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Aborted => "aborted",
            SessionStatus::Evicted => "evicted",
        };
        write!(f, "{}", s)
    }
}
