//! Outbound message port.
//!
//! The engine sends at most one reply per turn through this port and only
//! inspects the result for logging. Retries and delivery guarantees belong
//! to the transport behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatId, DomainError, ErrorCode, MessageId};
use crate::domain::message::OutboundReply;

/// What the transport reports back for a delivered reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    pub text: String,
}

/// Delivers replies to users.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, reply: OutboundReply) -> Result<SentMessage, SendError>;
}

/// Errors that can occur when delivering a reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The transport rejected or failed to deliver the reply.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport has shut down.
    #[error("transport closed")]
    Closed,
}

impl From<SendError> for DomainError {
    fn from(err: SendError) -> Self {
        DomainError::new(ErrorCode::TransportError, err.to_string())
    }
}
