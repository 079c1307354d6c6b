//! Recording message sender for testing.
//!
//! Captures every reply the engine sends so tests can assert on text,
//! markup and threading without a real transport.
//!
//! # Features
//!
//! - Call tracking for verification
//! - Error injection for send-failure testing
//! - Simulated latency for ordering tests
//!
//! # Example
//!
//! ```ignore
//! let sender = RecordingSender::new();
//! controller.execute(&msg, &sender).await;
//! assert_eq!(sender.last_text().await.as_deref(), Some("Please select an option"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::domain::foundation::{MessageId, UserId};
use crate::domain::message::OutboundReply;
use crate::ports::{MessageSender, SendError, SentMessage};

/// Outbound test double.
///
/// Clones share the same recording, so one handle can be given to the
/// engine while another is kept for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<OutboundReply>>>,
    failures: Arc<Mutex<VecDeque<SendError>>>,
    fail_always: Option<SendError>,
    delay: Duration,
    next_id: Arc<AtomicI64>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails with `error` (the reply is still recorded).
    pub fn failing(error: SendError) -> Self {
        Self {
            fail_always: Some(error),
            ..Self::default()
        }
    }

    /// Makes the next send fail with `error`. Queued failures are consumed
    /// in order.
    pub async fn fail_next(&self, error: SendError) {
        self.failures.lock().await.push_back(error);
    }

    /// Waits `delay` inside every send.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    // === Test Helpers ===

    /// All replies in the order they were sent.
    pub async fn sent(&self) -> Vec<OutboundReply> {
        self.sent.lock().await.clone()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|r| r.text.clone())
            .collect()
    }

    /// Replies addressed to `user`'s private chat.
    pub async fn sent_to(&self, user: UserId) -> Vec<OutboundReply> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|r| r.chat_id.value() == user.value())
            .cloned()
            .collect()
    }

    pub async fn last(&self) -> Option<OutboundReply> {
        self.sent.lock().await.last().cloned()
    }

    pub async fn last_text(&self) -> Option<String> {
        self.last().await.map(|r| r.text)
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, reply: OutboundReply) -> Result<SentMessage, SendError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let sent = SentMessage {
            message_id: MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            chat_id: reply.chat_id,
            text: reply.text.clone(),
        };
        self.sent.lock().await.push(reply);

        if let Some(err) = self.failures.lock().await.pop_front() {
            return Err(err);
        }
        match &self.fail_always {
            Some(err) => Err(err.clone()),
            None => Ok(sent),
        }
    }
}
