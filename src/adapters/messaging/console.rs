//! Console message sender.
//!
//! Prints replies as plain text, with keyboard buttons rendered one row per
//! line. Backs the interactive demo binary.

use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::domain::foundation::MessageId;
use crate::domain::message::{OutboundReply, ReplyMarkup};
use crate::ports::{MessageSender, SendError, SentMessage};

/// Writes each reply to an async writer, stdout by default.
pub struct ConsoleSender<W = Stdout> {
    out: Mutex<W>,
    next_id: AtomicI64,
}

impl ConsoleSender<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleSender<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            next_id: AtomicI64::new(0),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

/// Text block printed for one reply.
fn render(reply: &OutboundReply) -> String {
    let mut block = format!("bot> {}\n", reply.text);
    if let ReplyMarkup::Keyboard(keyboard) = &reply.markup {
        for row in keyboard.rows() {
            let buttons: Vec<String> = row.iter().map(|label| format!("[{}]", label)).collect();
            block.push_str(&format!("     {}\n", buttons.join(" ")));
        }
    }
    block
}

/// A reader that went away shows up as a closed transport.
fn write_error(err: io::Error) -> SendError {
    match err.kind() {
        io::ErrorKind::BrokenPipe => SendError::Closed,
        _ => SendError::Transport(err.to_string()),
    }
}

#[async_trait]
impl<W> MessageSender for ConsoleSender<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, reply: OutboundReply) -> Result<SentMessage, SendError> {
        let block = render(&reply);

        let mut out = self.out.lock().await;
        out.write_all(block.as_bytes()).await.map_err(write_error)?;
        out.flush().await.map_err(write_error)?;

        Ok(SentMessage {
            message_id: MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            chat_id: reply.chat_id,
            text: reply.text,
        })
    }
}
