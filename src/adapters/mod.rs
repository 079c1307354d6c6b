//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to the outside world:
//! - `session` - Session store implementations (in-memory)
//! - `messaging` - Outbound senders (console, recording test double)
//! - `telemetry` - Logging subscriber setup and runtime control

pub mod messaging;
pub mod session;
pub mod telemetry;

pub use messaging::{ConsoleSender, RecordingSender};
pub use session::InMemorySessionStore;
pub use telemetry::{LogHandle, TelemetryError};
