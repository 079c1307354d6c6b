//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait, and error
//! types that form the vocabulary of the workflow engine.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::{ChatId, MessageId, SessionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
