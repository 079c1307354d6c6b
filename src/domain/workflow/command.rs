//! Bot command that triggers a workflow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical, case-insensitive command name.
///
/// Normalized at construction: surrounding whitespace, a leading `/` and an
/// `@botname` suffix are dropped and the rest is uppercased, so
/// `"/ac_control@home_bot"`, `"ac_control"` and `"AC_CONTROL"` all name the
/// same workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(String);

impl Command {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        let name = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let name = name.split('@').next().unwrap_or_default();
        Self(name.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Command {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
