//! Answers collected over one workflow run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;
use crate::domain::workflow::Command;

/// The answer map of a session, tagged with who answered and which command
/// started the run.
///
/// Handed to the caller when a workflow completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputs {
    user_id: UserId,
    command: Command,
    data: HashMap<String, String>,
}

impl UserInputs {
    pub fn new(user_id: UserId, command: Command) -> Self {
        Self {
            user_id,
            command,
            data: HashMap::new(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Stores `value` under `key`, replacing an earlier answer.
    ///
    /// Returns false (and stores nothing) when `key` is empty.
    pub fn record(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if key.is_empty() {
            return false;
        }
        self.data.insert(key, value.into());
        true
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> UserInputs {
        UserInputs::new(UserId::new(1234), Command::new("/cmd1"))
    }

    #[test]
    fn records_under_key() {
        let mut i = inputs();
        assert!(i.record("K1", "Step1Option1"));
        assert_eq!(i.get("K1"), Some("Step1Option1"));
        assert_eq!(i.len(), 1);
    }

    #[test]
    fn empty_key_is_not_recorded() {
        let mut i = inputs();
        assert!(!i.record("", "ignored"));
        assert!(i.is_empty());
    }

    #[test]
    fn later_answer_replaces_earlier() {
        let mut i = inputs();
        i.record("K1", "first");
        i.record("K1", "second");
        assert_eq!(i.get("K1"), Some("second"));
        assert_eq!(i.len(), 1);
    }

    #[test]
    fn serializes_with_user_and_command() {
        let mut i = inputs();
        i.record("K1", "A");
        let json = serde_json::to_value(&i).unwrap();
        assert_eq!(json["user_id"], 1234);
        assert_eq!(json["command"], "CMD1");
        assert_eq!(json["data"]["K1"], "A");
    }
}
