//! Shared outbound half of the client WebSocket.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures_util::SinkExt;
use futures_util::stream::SplitSink;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::protocol::ServerMessage;

/// Close frames cap the reason at 123 bytes; leave headroom for UTF-8.
const MAX_CLOSE_REASON_BYTES: usize = 120;

/// Cloneable handle to the client-facing sink, shared by both relay loops.
#[derive(Clone)]
pub struct ClientSender {
    sink: Arc<Mutex<SplitSink<WebSocket, Message>>>,
}

impl ClientSender {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Serializes a message and sends it as one text frame.
    pub async fn send(&self, msg: &ServerMessage) -> anyhow::Result<()> {
        let serialized =
            serde_json::to_string(msg).context("failed to serialize server message")?;
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(serialized.into()))
            .await
            .context("failed to send message to client")?;
        Ok(())
    }

    /// Sends a message, logging instead of failing when the client is gone.
    pub async fn send_best_effort(&self, msg: &ServerMessage) {
        if let Err(e) = self.send(msg).await {
            debug!("dropping server message for closed client: {e:#}");
        }
    }

    /// Closes the socket with a normal close frame (code 1000).
    pub async fn close_normal(&self) {
        let frame = CloseFrame {
            code: close_code::NORMAL,
            reason: "".into(),
        };
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send(Message::Close(Some(frame))).await {
            debug!("closing client socket returned an error: {e}");
        }
    }

    /// Closes the socket with an error close frame (code 1011).
    pub async fn close_with_error(&self, reason: &str) {
        let frame = CloseFrame {
            code: close_code::ERROR,
            reason: truncate_reason(reason).to_string().into(),
        };
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send(Message::Close(Some(frame))).await {
            warn!("failed to close client socket: {e}");
        }
    }
}

/// Trims a close reason to fit the frame limit without splitting a character.
fn truncate_reason(reason: &str) -> &str {
    if reason.len() <= MAX_CLOSE_REASON_BYTES {
        return reason;
    }
    let mut end = MAX_CLOSE_REASON_BYTES;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    &reason[..end]
}
