//! Result of handling one inbound message.

use crate::domain::session::UserInputs;

/// What a single turn did.
///
/// Only [`TurnOutcome::Completed`] carries answers; every other variant
/// means "not done" to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Unknown command, or plain text from a user with no session.
    Unrecognized,
    /// The session started or advanced and `step`'s prompt was sent.
    Prompted { step: String },
    /// Input failed validation at `step`; the session did not move.
    Rejected { step: String },
    /// The cancel button was pressed and the session removed.
    Cancelled,
    /// `step` branched to a key with no target and the session was removed.
    Aborted { step: String },
    /// A terminal step was reached.
    Completed(UserInputs),
    /// The session store failed; nothing was sent.
    Failed,
}

impl TurnOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, TurnOutcome::Completed(_))
    }

    pub fn inputs(&self) -> Option<&UserInputs> {
        match self {
            TurnOutcome::Completed(inputs) => Some(inputs),
            _ => None,
        }
    }

    pub fn into_inputs(self) -> Option<UserInputs> {
        match self {
            TurnOutcome::Completed(inputs) => Some(inputs),
            _ => None,
        }
    }

    /// The `(answers, done)` pair callers of a plain engine loop expect.
    pub fn into_pair(self) -> (Option<UserInputs>, bool) {
        let done = self.is_done();
        (self.into_inputs(), done)
    }
}
