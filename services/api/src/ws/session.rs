//! Manages the WebSocket connection lifecycle for a practice conversation.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::StreamExt;
use futures_util::stream::SplitStream;
use gemini_live::LiveSession;
use tracing::{Instrument, error, info, instrument};

use super::protocol::ServerMessage;
use super::relay;
use super::state::SessionState;
use super::transport::ClientSender;
use crate::state::AppState;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Announces readiness to the client, then runs the relayed session until
/// either side disconnects. Fatal errors are reported to the client and the
/// socket is closed with an error close frame.
#[instrument(name = "conversation", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id: u32 = rand::random();
    tracing::Span::current().record("session_id", &session_id.to_string());
    info!("New WebSocket connection");

    let (socket_tx, socket_rx) = socket.split();
    let client = ClientSender::new(socket_tx);

    if let Err(e) = client
        .send(&ServerMessage::Status {
            message: "connected".to_string(),
        })
        .await
    {
        info!("client left before the session started: {e:#}");
        return;
    }
    let voice = if state.tts.enabled() {
        "voice-enabled"
    } else {
        "voice-disabled"
    };
    client
        .send_best_effort(&ServerMessage::Status {
            message: voice.to_string(),
        })
        .await;

    match run_session(&state, client.clone(), socket_rx).await {
        Ok(()) => {
            info!("conversation finished");
            client.close_normal().await;
        }
        Err(e) => {
            error!(error = ?e, "conversation failed");
            let message = format!("session error: {e:#}");
            client
                .send_best_effort(&ServerMessage::Error {
                    message: message.clone(),
                })
                .await;
            client.close_with_error(&message).await;
        }
    }
}

/// Connects the upstream live session and runs both relay loops to completion.
async fn run_session(
    state: &AppState,
    client: ClientSender,
    socket_rx: SplitStream<WebSocket>,
) -> anyhow::Result<()> {
    let live = LiveSession::connect(&state.config.live_config())
        .await
        .context("failed to establish live session")?;
    let (upstream, events) = live.split();
    info!("live session established");

    let session = Arc::new(SessionState::default());

    let mut inbound = tokio::spawn(
        relay::forward_client_commands(
            socket_rx,
            upstream.clone(),
            client.clone(),
            Arc::clone(&session),
        )
        .in_current_span(),
    );
    let mut outbound = tokio::spawn(
        relay::forward_live_events(events, client, Arc::clone(&session), Arc::clone(&state.tts))
            .in_current_span(),
    );

    // Whichever loop finishes first decides the outcome; the other is
    // cancelled and awaited before the upstream link is torn down.
    let (finished, unfinished) = tokio::select! {
        result = &mut inbound => (result, &mut outbound),
        result = &mut outbound => (result, &mut inbound),
    };
    unfinished.abort();
    let _ = unfinished.await;
    upstream.close().await;

    match finished {
        Ok(result) => result,
        Err(join_error) => Err(anyhow::anyhow!("relay task panicked: {join_error}")),
    }
}
