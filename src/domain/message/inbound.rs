//! Messages arriving from the chat transport.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatId, MessageId, UserId};

/// The user who wrote an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub username: Option<String>,
}

/// A single message delivered by the transport.
///
/// Command detection follows the usual bot convention: text starting with
/// `/` followed by a name, optionally suffixed with `@botname`, optionally
/// followed by arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    pub author: Author,
    pub text: String,
}

impl InboundMessage {
    /// Creates a message from the given user in the given chat.
    pub fn new(
        message_id: impl Into<MessageId>,
        chat_id: impl Into<ChatId>,
        user_id: impl Into<UserId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            chat_id: chat_id.into(),
            author: Author {
                id: user_id.into(),
                username: None,
            },
            text: text.into(),
        }
    }

    /// Attaches the author's display username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.author.username = Some(username.into());
        self
    }

    /// Returns the id of the author.
    pub fn user_id(&self) -> UserId {
        self.author.id
    }

    /// Returns the author's username, or an empty string.
    pub fn username(&self) -> &str {
        self.author.username.as_deref().unwrap_or("")
    }

    /// Returns true if this message invokes a bot command.
    pub fn is_command(&self) -> bool {
        self.command().is_some()
    }

    /// Returns the command name without the leading `/` or `@botname` suffix.
    pub fn command(&self) -> Option<&str> {
        let rest = self.text.strip_prefix('/')?;
        let token = rest.split(char::is_whitespace).next()?;
        let name = token.split('@').next()?;
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}
