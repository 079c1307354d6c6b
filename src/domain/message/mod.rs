//! Message module - what flows in from and out to the chat transport.

mod inbound;
mod keyboard;
mod outbound;

pub use inbound::{Author, InboundMessage};
pub use keyboard::Keyboard;
pub use outbound::{OutboundReply, ParseMode, ReplyMarkup};
