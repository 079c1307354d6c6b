//! Domain layer containing the workflow model and session state.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `message` - Inbound messages and outbound replies
//! - `workflow` - Steps, the step graph, and per-step strategies
//! - `session` - Per-user progress through a workflow

pub mod foundation;
pub mod message;
pub mod session;
pub mod workflow;
