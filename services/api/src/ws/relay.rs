//! The two relay loops that bridge a client socket and a live model session.

use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::StreamExt;
use futures_util::stream::SplitStream;
use gemini_live::{LiveError, LiveEvent, LiveEvents, LiveHandle};
use tracing::{debug, info, warn};

use super::protocol::{ClientCommand, ControlAction, ServerMessage};
use super::state::SessionState;
use super::transport::ClientSender;
use crate::prompts;
use crate::scoring;
use crate::tts::SpeechSynthesizer;

/// Reads client frames and forwards them upstream until the client leaves.
pub async fn forward_client_commands(
    mut socket_rx: SplitStream<WebSocket>,
    upstream: LiveHandle,
    client: ClientSender,
    session: Arc<SessionState>,
) -> anyhow::Result<()> {
    while let Some(frame) = socket_rx.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                info!("client stream ended: {e}");
                break;
            }
        };
        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientCommand>(&text) {
                Ok(command) => {
                    dispatch_command(command, &upstream, &client, &session).await?;
                }
                Err(e) => {
                    debug!("ignoring unknown client message: {e}");
                }
            },
            Message::Binary(bytes) => {
                // Raw frames are audio; re-encode so both ingest paths match.
                let data = STANDARD.encode(&bytes);
                stream_audio_chunk(&data, &upstream, &session).await?;
            }
            Message::Close(_) => {
                info!("client closed the connection");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }
    Ok(())
}

/// The sending surface of the upstream link that client commands drive.
#[async_trait]
trait UpstreamSender: Send + Sync {
    async fn send_user_text(&self, text: &str) -> Result<(), LiveError>;
    async fn send_audio_chunk(&self, base64_data: &str) -> Result<(), LiveError>;
    async fn end_turn(&self) -> Result<(), LiveError>;
}

#[async_trait]
impl UpstreamSender for LiveHandle {
    async fn send_user_text(&self, text: &str) -> Result<(), LiveError> {
        LiveHandle::send_user_text(self, text).await
    }

    async fn send_audio_chunk(&self, base64_data: &str) -> Result<(), LiveError> {
        LiveHandle::send_audio_chunk(self, base64_data).await
    }

    async fn end_turn(&self) -> Result<(), LiveError> {
        LiveHandle::end_turn(self).await
    }
}

async fn dispatch_command(
    command: ClientCommand,
    upstream: &impl UpstreamSender,
    client: &ClientSender,
    session: &SessionState,
) -> anyhow::Result<()> {
    match command {
        ClientCommand::AudioChunk { data } => {
            stream_audio_chunk(&data, upstream, session).await?;
        }
        ClientCommand::EndTurn => {
            info!("client ended its turn");
            upstream.end_turn().await?;
        }
        ClientCommand::Preference { theme, scenario } => {
            let theme = theme.as_deref().filter(|s| !s.is_empty());
            let scenario = scenario.as_deref().filter(|s| !s.is_empty());
            if let (Some(theme), Some(scenario)) = (theme, scenario) {
                info!(theme, scenario, "client stated a practice preference");
                upstream
                    .send_user_text(&prompts::preference_statement(theme, scenario))
                    .await?;
            } else {
                debug!("ignoring preference without both theme and scenario");
            }
        }
        ClientCommand::StartPractice { theme, scenario } => {
            let theme = theme.as_deref().filter(|s| !s.is_empty());
            let scenario = scenario.as_deref().filter(|s| !s.is_empty());
            info!(?theme, ?scenario, "client requested a practice round");
            session.set_paused(false);
            // Audio from before the round belongs to no turn.
            session.drain_audio();
            let label = prompts::practice_focus_label(theme, scenario);
            client
                .send_best_effort(&ServerMessage::Status {
                    message: format!("AI 正在准备 {label} 的练习句子…"),
                })
                .await;
            upstream
                .send_user_text(&prompts::practice_sentence_prompt(theme, scenario))
                .await?;
        }
        ClientCommand::Control { action } => {
            let paused = action == ControlAction::Pause;
            info!(paused, "client toggled the pause state");
            session.set_paused(paused);
        }
    }
    Ok(())
}

/// Forwards one audio chunk upstream and keeps a local copy for scoring.
/// Chunks arriving while the session is paused are dropped.
async fn stream_audio_chunk(
    base64_data: &str,
    upstream: &impl UpstreamSender,
    session: &SessionState,
) -> anyhow::Result<()> {
    if session.is_paused() {
        debug!("session paused, dropping audio chunk");
        return Ok(());
    }
    upstream.send_audio_chunk(base64_data).await?;
    match STANDARD.decode(base64_data) {
        Ok(pcm) => session.push_audio(&pcm),
        Err(e) => debug!("audio chunk is not valid base64, skipping local copy: {e}"),
    }
    Ok(())
}

/// Streams model events back to the client, augmenting each completed turn
/// with a pronunciation score and synthesized speech.
pub async fn forward_live_events(
    mut events: LiveEvents,
    client: ClientSender,
    session: Arc<SessionState>,
    tts: Arc<dyn SpeechSynthesizer>,
) -> anyhow::Result<()> {
    while let Some(event) = events.next_event().await {
        match event {
            LiveEvent::TextDelta { text } => {
                client.send(&ServerMessage::PartialResponse { text }).await?;
            }
            LiveEvent::TurnComplete { full_text } => {
                let paused = session.apply_turn_triggers(&full_text);
                let audio = session.drain_audio();
                let score = (!audio.is_empty()).then(|| scoring::pronunciation_score(&audio));
                let english = english_segment(&full_text);
                let speech = if !english.is_empty() && tts.enabled() && !paused {
                    tts.synthesize(english).await
                } else {
                    None
                };
                client
                    .send(&ServerMessage::FinalResponse {
                        text: full_text,
                        paused,
                        score,
                        audio: speech,
                    })
                    .await?;
                client.send(&ServerMessage::PauseState { paused }).await?;
                info!(paused, score = ?score, "delivered final response");
            }
            LiveEvent::Disconnected {
                code,
                reason,
                graceful,
            } => {
                client
                    .send_best_effort(&ServerMessage::GeminiDisconnected {
                        code,
                        reason: reason.clone(),
                    })
                    .await;
                if graceful {
                    info!(code, reason = %reason, "live connection closed");
                } else {
                    warn!(code, reason = %reason, "live connection lost");
                    bail!("live connection closed: {code} {reason}");
                }
            }
        }
    }
    Ok(())
}

/// Returns the English half of a bilingual reply, the text before the
/// first `---` separator.
fn english_segment(full_text: &str) -> &str {
    full_text.split("---").next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::transport::testing::{PeerSocket, loopback_socket};
    use tokio_tungstenite::tungstenite::Message as PeerMessage;

    #[derive(Clone, Debug, PartialEq)]
    enum UpstreamCall {
        Text(String),
        Audio(String),
        EndTurn,
    }

    /// Test double that records everything sent toward the model.
    #[derive(Default)]
    struct RecordingUpstream {
        calls: std::sync::Mutex<Vec<UpstreamCall>>,
    }

    impl RecordingUpstream {
        fn calls(&self) -> Vec<UpstreamCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpstreamSender for RecordingUpstream {
        async fn send_user_text(&self, text: &str) -> Result<(), LiveError> {
            self.calls
                .lock()
                .unwrap()
                .push(UpstreamCall::Text(text.to_string()));
            Ok(())
        }

        async fn send_audio_chunk(&self, base64_data: &str) -> Result<(), LiveError> {
            self.calls
                .lock()
                .unwrap()
                .push(UpstreamCall::Audio(base64_data.to_string()));
            Ok(())
        }

        async fn end_turn(&self) -> Result<(), LiveError> {
            self.calls.lock().unwrap().push(UpstreamCall::EndTurn);
            Ok(())
        }
    }

    async fn loopback_sender() -> (ClientSender, PeerSocket) {
        let (socket, peer) = loopback_socket().await;
        let (sink, _stream) = socket.split();
        (ClientSender::new(sink), peer)
    }

    #[tokio::test]
    async fn paused_session_sends_no_audio_upstream_until_resumed() {
        let (client, _peer) = loopback_sender().await;
        let upstream = RecordingUpstream::default();
        let session = SessionState::default();
        let chunk = STANDARD.encode([16u8, 0, 32, 0]);

        dispatch_command(
            ClientCommand::Control {
                action: ControlAction::Pause,
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();
        dispatch_command(
            ClientCommand::AudioChunk {
                data: chunk.clone(),
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();
        assert!(upstream.calls().is_empty());
        assert!(session.drain_audio().is_empty());

        dispatch_command(
            ClientCommand::Control {
                action: ControlAction::Resume,
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();
        dispatch_command(
            ClientCommand::AudioChunk {
                data: chunk.clone(),
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();
        assert_eq!(upstream.calls(), vec![UpstreamCall::Audio(chunk)]);
        assert_eq!(session.drain_audio(), vec![16, 0, 32, 0]);
    }

    #[tokio::test]
    async fn start_practice_resets_state_and_requests_a_sentence() {
        let (client, mut peer) = loopback_sender().await;
        let upstream = RecordingUpstream::default();
        let session = SessionState::default();
        session.set_paused(true);
        session.push_audio(&[9, 9]);

        dispatch_command(
            ClientCommand::StartPractice {
                theme: Some("travel".to_string()),
                scenario: Some("hotel".to_string()),
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();

        assert!(!session.is_paused());
        assert!(session.drain_audio().is_empty());
        match upstream.calls().as_slice() {
            [UpstreamCall::Text(prompt)] => {
                assert!(prompt.contains("theme 'travel' and scenario 'hotel'"));
            }
            other => panic!("unexpected upstream calls: {other:?}"),
        }
        match peer.next().await {
            Some(Ok(PeerMessage::Text(text))) => {
                assert!(text.contains("正在准备 travel - hotel"));
            }
            other => panic!("expected a status frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn preference_needs_both_theme_and_scenario() {
        let (client, _peer) = loopback_sender().await;
        let upstream = RecordingUpstream::default();
        let session = SessionState::default();

        dispatch_command(
            ClientCommand::Preference {
                theme: Some("travel".to_string()),
                scenario: None,
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();
        dispatch_command(
            ClientCommand::Preference {
                theme: Some("travel".to_string()),
                scenario: Some(String::new()),
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();
        assert!(upstream.calls().is_empty());

        dispatch_command(
            ClientCommand::Preference {
                theme: Some("travel".to_string()),
                scenario: Some("airport".to_string()),
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();
        assert_eq!(
            upstream.calls(),
            vec![UpstreamCall::Text(
                "I'd like to practice the travel theme focusing on the airport scenario."
                    .to_string()
            )]
        );
    }

    #[tokio::test]
    async fn end_turn_forwards_the_completion_marker() {
        let (client, _peer) = loopback_sender().await;
        let upstream = RecordingUpstream::default();
        let session = SessionState::default();

        dispatch_command(ClientCommand::EndTurn, &upstream, &client, &session)
            .await
            .unwrap();
        assert_eq!(upstream.calls(), vec![UpstreamCall::EndTurn]);
    }

    #[tokio::test]
    async fn undecodable_audio_still_goes_upstream_but_is_not_buffered() {
        let (client, _peer) = loopback_sender().await;
        let upstream = RecordingUpstream::default();
        let session = SessionState::default();

        dispatch_command(
            ClientCommand::AudioChunk {
                data: "***".to_string(),
            },
            &upstream,
            &client,
            &session,
        )
        .await
        .unwrap();
        assert_eq!(upstream.calls(), vec![UpstreamCall::Audio("***".to_string())]);
        assert!(session.drain_audio().is_empty());
    }

    #[test]
    fn english_segment_takes_text_before_the_separator() {
        assert_eq!(english_segment("Hello there---你好"), "Hello there");
    }

    #[test]
    fn english_segment_keeps_whole_text_without_separator() {
        assert_eq!(english_segment("Just English"), "Just English");
    }

    #[test]
    fn english_segment_trims_surrounding_whitespace() {
        assert_eq!(english_segment("  Hi there \n---\n你好"), "Hi there");
    }

    #[test]
    fn english_segment_of_empty_text_is_empty() {
        assert_eq!(english_segment(""), "");
        assert_eq!(english_segment("---只有中文"), "");
    }
}
