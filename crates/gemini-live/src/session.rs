//! Connection lifecycle for a live conversation session.
//!
//! [`LiveSession::connect`] performs the full startup sequence: websocket
//! connection (optionally through an HTTP proxy), setup message, server
//! acknowledgement, system instructions, keepalive spawn. The session then
//! splits into a clonable [`LiveHandle`] for sending and a [`LiveEvents`]
//! stream for receiving.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Bytes;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::error::LiveError;
use crate::proxy;
use crate::types::{
    AUDIO_MIME_TYPE, ClientContent, ClientMessage, Content, GenerationConfig, LiveEvent,
    LiveServerMessage, MediaChunk, Part, RealtimeInput, ResponseModality, Setup,
};

pub(crate) type WsTransport = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = Arc<Mutex<SplitSink<WsTransport, WsMessage>>>;

/// Default hostname of the live endpoint.
pub const DEFAULT_HOST: &str = "generativelanguage.googleapis.com";

/// Interval between keepalive pings on the upstream socket.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// How long to wait for the setup acknowledgement before giving up.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters for a live session.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Fully qualified model name, e.g. `models/gemini-2.0-flash-exp`.
    pub model: String,
    pub api_key: String,
    /// Hostname of the live endpoint, see [`DEFAULT_HOST`].
    pub host: String,
    /// Optional HTTP proxy (`http://host:port`) to tunnel the connection
    /// through.
    pub proxy_url: Option<String>,
    /// System instructions delivered as the first completed user turn.
    pub instructions: String,
}

/// An established live session, ready to be split into its two halves.
pub struct LiveSession {
    handle: LiveHandle,
    events: LiveEvents,
}

impl LiveSession {
    /// Connects and completes the setup handshake.
    ///
    /// On success the server has acknowledged setup, the system
    /// instructions are delivered and the keepalive loop is running.
    pub async fn connect(config: &LiveConfig) -> Result<Self, LiveError> {
        let uri = format!(
            "wss://{}/ws/google.ai.generativelanguage.v1alpha.GenerativeService.BidiGenerateContent?key={}",
            config.host, config.api_key
        );

        let transport = match &config.proxy_url {
            Some(proxy_url) => proxy::connect_via_proxy(&uri, proxy_url, &config.host).await?,
            None => {
                let (transport, _) = connect_async(&uri).await.map_err(LiveError::Connect)?;
                transport
            }
        };
        info!(host = %config.host, model = %config.model, "connected to live endpoint");

        let (sink, mut stream) = transport.split();
        let sink: WsSink = Arc::new(Mutex::new(sink));
        let handle = LiveHandle { sink: sink.clone() };

        handle
            .send_payload(&ClientMessage::Setup(Setup {
                model: config.model.clone(),
                generation_config: GenerationConfig {
                    response_modalities: vec![ResponseModality::Text],
                },
            }))
            .await?;
        await_setup_ack(&mut stream).await?;
        debug!("setup acknowledged");

        handle.send_user_text(&config.instructions).await?;
        info!("live session ready");

        let keepalive = tokio::spawn(keepalive_loop(sink.clone()));
        Ok(Self {
            handle,
            events: LiveEvents {
                stream,
                decoder: TurnDecoder::default(),
                queued: VecDeque::new(),
                keepalive,
                closed: false,
            },
        })
    }

    /// Splits the session into the sending handle and the event stream.
    pub fn split(self) -> (LiveHandle, LiveEvents) {
        (self.handle, self.events)
    }
}

/// Waits for the first server frame and verifies it acknowledges setup.
async fn await_setup_ack(stream: &mut SplitStream<WsTransport>) -> Result<(), LiveError> {
    let reply = tokio::time::timeout(HANDSHAKE_TIMEOUT, stream.next())
        .await
        .map_err(|_| LiveError::HandshakeTimeout)?;
    match reply {
        Some(Ok(WsMessage::Text(text))) => {
            let parsed: LiveServerMessage =
                serde_json::from_str(&text).map_err(|_| LiveError::Handshake)?;
            if parsed.setup_complete.is_some() {
                Ok(())
            } else {
                Err(LiveError::Handshake)
            }
        }
        _ => Err(LiveError::Handshake),
    }
}

/// Pings the server so long-idle sessions are not reaped.
///
/// A failed ping only ends the liveness loop; the connection error itself
/// surfaces through the event stream.
async fn keepalive_loop(sink: WsSink) {
    let mut ticker = tokio::time::interval(KEEPALIVE_INTERVAL);
    ticker.tick().await; // first tick fires immediately
    loop {
        ticker.tick().await;
        let mut sink = sink.lock().await;
        if let Err(e) = sink.send(WsMessage::Ping(Bytes::new())).await {
            warn!(error = %e, "keepalive ping failed, stopping liveness checks");
            break;
        }
        debug!("sent keepalive ping");
    }
}

/// Clonable sending half of a live session.
#[derive(Clone)]
pub struct LiveHandle {
    sink: WsSink,
}

impl LiveHandle {
    async fn send_payload(&self, message: &ClientMessage) -> Result<(), LiveError> {
        let serialized = serde_json::to_string(message)?;
        let mut sink = self.sink.lock().await;
        sink.send(WsMessage::Text(serialized.into()))
            .await
            .map_err(LiveError::Send)
    }

    /// Sends `text` as a completed user turn.
    pub async fn send_user_text(&self, text: &str) -> Result<(), LiveError> {
        self.send_payload(&ClientMessage::ClientContent(ClientContent {
            turns: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }],
            turn_complete: true,
        }))
        .await
    }

    /// Streams one base64-encoded PCM16 chunk as realtime input.
    pub async fn send_audio_chunk(&self, base64_data: &str) -> Result<(), LiveError> {
        self.send_payload(&ClientMessage::RealtimeInput(RealtimeInput {
            media_chunks: vec![MediaChunk {
                mime_type: AUDIO_MIME_TYPE.to_string(),
                data: base64_data.to_string(),
            }],
        }))
        .await
    }

    /// Marks the end of the user's current turn without adding content.
    pub async fn end_turn(&self) -> Result<(), LiveError> {
        self.send_payload(&ClientMessage::ClientContent(ClientContent {
            turns: Vec::new(),
            turn_complete: true,
        }))
        .await
    }

    /// Closes the connection. Safe to call after the link already went away.
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.close().await {
            debug!(error = %e, "closing live sink returned an error");
        }
    }
}

/// Receiving half of a live session, decoding server frames into
/// [`LiveEvent`]s.
pub struct LiveEvents {
    stream: SplitStream<WsTransport>,
    decoder: TurnDecoder,
    queued: VecDeque<LiveEvent>,
    keepalive: JoinHandle<()>,
    closed: bool,
}

impl LiveEvents {
    /// Returns the next event, or `None` once the connection has closed and
    /// the final [`LiveEvent::Disconnected`] was already delivered.
    pub async fn next_event(&mut self) -> Option<LiveEvent> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Some(event);
            }
            if self.closed {
                return None;
            }
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    self.queued.extend(self.decoder.ingest(&text));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    return Some(self.finish(disconnect_event(frame)));
                }
                // Ping, pong and binary frames carry no session data.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "live stream failed");
                    return Some(self.finish(LiveEvent::Disconnected {
                        code: 1006,
                        reason: e.to_string(),
                        graceful: false,
                    }));
                }
                None => {
                    return Some(self.finish(LiveEvent::Disconnected {
                        code: 1006,
                        reason: String::new(),
                        graceful: false,
                    }));
                }
            }
        }
    }

    fn finish(&mut self, event: LiveEvent) -> LiveEvent {
        self.closed = true;
        self.keepalive.abort();
        event
    }
}

impl Drop for LiveEvents {
    fn drop(&mut self) {
        self.keepalive.abort();
    }
}

/// Accumulates text fragments between turn boundaries.
#[derive(Default)]
struct TurnDecoder {
    pending_text: Vec<String>,
}

impl TurnDecoder {
    /// Decodes one raw server frame into zero or more events.
    ///
    /// Undecodable frames and frames without content are dropped.
    fn ingest(&mut self, raw: &str) -> Vec<LiveEvent> {
        let payload: LiveServerMessage = match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, "ignoring undecodable live frame");
                return Vec::new();
            }
        };
        let Some(content) = payload.server_content else {
            return Vec::new();
        };

        let mut events = Vec::new();
        if let Some(model_turn) = content.model_turn {
            for part in model_turn.parts {
                if let Some(text) = part.text {
                    if !text.is_empty() {
                        self.pending_text.push(text.clone());
                        events.push(LiveEvent::TextDelta { text });
                    }
                }
            }
        }
        if content.turn_complete.unwrap_or(false) {
            let full_text = self.pending_text.concat();
            self.pending_text.clear();
            events.push(LiveEvent::TurnComplete { full_text });
        }
        events
    }
}

fn disconnect_event(frame: Option<CloseFrame>) -> LiveEvent {
    match frame {
        Some(frame) => {
            let code = u16::from(frame.code);
            LiveEvent::Disconnected {
                code,
                reason: frame.reason.to_string(),
                graceful: is_graceful_close(code),
            }
        }
        // A close without a status code maps to 1005 and counts as deliberate.
        None => LiveEvent::Disconnected {
            code: 1005,
            reason: String::new(),
            graceful: true,
        },
    }
}

/// Close codes that mean the server ended the session on purpose.
fn is_graceful_close(code: u16) -> bool {
    matches!(code, 1000 | 1001 | 1005)
}
