//! Replies the engine hands to the transport.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{InboundMessage, Keyboard};
use crate::domain::foundation::{ChatId, MessageId};

/// How the transport should interpret markup in reply text.
///
/// The engine never inspects text; this is a pass-through hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    #[default]
    Html,
    MarkdownV2,
}

impl ParseMode {
    /// Returns the name chat APIs conventionally use for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
            ParseMode::MarkdownV2 => "MarkdownV2",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input widget to accompany a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyMarkup {
    /// Leave whatever the user currently sees untouched.
    Unchanged,
    /// Show a custom keyboard.
    Keyboard(Keyboard),
    /// Drop any custom keyboard and show plain text entry.
    ///
    /// `selective` limits the removal to the user being replied to.
    RemoveKeyboard { selective: bool },
}

impl ReplyMarkup {
    /// Plain text entry for the replied-to user only.
    pub fn remove_keyboard() -> Self {
        ReplyMarkup::RemoveKeyboard { selective: true }
    }
}

/// One outbound reply, addressed to the chat and message it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub chat_id: ChatId,
    pub reply_to: MessageId,
    pub text: String,
    pub parse_mode: ParseMode,
    pub markup: ReplyMarkup,
}

impl OutboundReply {
    /// Starts an empty reply threaded to `msg`.
    pub fn responding_to(msg: &InboundMessage, parse_mode: ParseMode) -> Self {
        Self {
            chat_id: msg.chat_id,
            reply_to: msg.message_id,
            text: String::new(),
            parse_mode,
            markup: ReplyMarkup::Unchanged,
        }
    }

    /// Sets the reply text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the input widget.
    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = markup;
        self
    }

    /// Clears any custom keyboard for the replied-to user.
    pub fn removing_keyboard(self) -> Self {
        self.with_markup(ReplyMarkup::remove_keyboard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode_defaults_to_html() {
        assert_eq!(ParseMode::default(), ParseMode::Html);
        assert_eq!(ParseMode::Html.to_string(), "HTML");
        assert_eq!(ParseMode::MarkdownV2.to_string(), "MarkdownV2");
    }

    #[test]
    fn parse_mode_deserializes_from_snake_case() {
        let mode: ParseMode = serde_json::from_str("\"markdown_v2\"").unwrap();
        assert_eq!(mode, ParseMode::MarkdownV2);
    }

    #[test]
    fn reply_is_threaded_to_inbound_message() {
        let msg = InboundMessage::new(77, 5, 1234, "hello");
        let reply = OutboundReply::responding_to(&msg, ParseMode::Html).with_text("hi");

        assert_eq!(reply.chat_id, ChatId::new(5));
        assert_eq!(reply.reply_to, MessageId::new(77));
        assert_eq!(reply.text, "hi");
        assert_eq!(reply.markup, ReplyMarkup::Unchanged);
    }

    #[test]
    fn removing_keyboard_is_selective() {
        let msg = InboundMessage::new(1, 1, 1, "x");
        let reply = OutboundReply::responding_to(&msg, ParseMode::Html).removing_keyboard();
        assert_eq!(reply.markup, ReplyMarkup::RemoveKeyboard { selective: true });
    }

    #[test]
    fn markup_serializes_with_type_tag() {
        let json = serde_json::to_value(ReplyMarkup::remove_keyboard()).unwrap();
        assert_eq!(json["type"], "remove_keyboard");
        assert_eq!(json["selective"], true);
    }
}
