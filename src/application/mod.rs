//! Application layer - the engine and the services around it.
//!
//! - `WorkflowController` - handles one inbound message per call
//! - `UserGate` - serializes turns of the same user
//! - `Dispatcher` - message pump with per-user ordering
//! - `SessionReaper` - evicts idle sessions

mod controller;
mod dispatcher;
mod outcome;
mod session_reaper;
mod user_gate;

pub use controller::{NotFoundReply, WorkflowController};
pub use dispatcher::{DispatchSummary, Dispatcher};
pub use outcome::TurnOutcome;
pub use session_reaper::SessionReaper;
pub use user_gate::{UserGate, UserTurn};
