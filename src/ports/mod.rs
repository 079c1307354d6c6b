//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Where live sessions are kept between turns
//! - `MessageSender` - How replies reach the user

mod message_sender;
mod session_store;

pub use message_sender::{MessageSender, SendError, SentMessage};
pub use session_store::{SessionStore, SessionStoreError};
