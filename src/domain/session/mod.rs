//! Session domain module.
//!
//! A session is one user's run through one workflow: the step they are at
//! and the answers collected so far. Sessions share their workflow's step
//! graph and only hold an index into it.

mod inputs;
#[allow(clippy::module_inception)]
mod session;
mod status;

pub use inputs::UserInputs;
pub use session::Session;
pub use status::SessionStatus;
