//! Cancel button configuration.

use serde::{Deserialize, Serialize};

/// A button label that aborts the running workflow, and the reply sent when
/// it is pressed.
///
/// Configured per workflow as a default and optionally overridden per step.
/// Absence of any configuration means the workflow has no cancel button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelButton {
    label: String,
    reply: String,
}

impl CancelButton {
    /// `label` is the exact text that cancels (e.g. "RESET");
    /// `reply` is what the user is told afterwards.
    pub fn new(label: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reply: reply.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// Exact, case-sensitive comparison against the label.
    pub fn matches(&self, text: &str) -> bool {
        self.label == text
    }
}
