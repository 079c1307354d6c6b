//! Outbound message adapters.

mod console;
mod recording;

pub use console::ConsoleSender;
pub use recording::RecordingSender;
