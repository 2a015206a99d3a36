//! Speech synthesis for final responses.
//!
//! Synthesis is strictly best-effort: a failed or slow request costs the
//! client the audio attachment, never the turn.

use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on one synthesis round trip.
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns response text into speech audio for playback in the browser.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Whether synthesis is available at all.
    fn enabled(&self) -> bool;

    /// Returns base64-encoded MP3 audio, or `None` when synthesis is
    /// unavailable or failed.
    async fn synthesize(&self, text: &str) -> Option<String>;
}

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsTts {
    client: reqwest::Client,
    api_key: Option<String>,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsTts {
    /// Builds the client. Without an API key the synthesizer reports itself
    /// disabled and every synthesis call returns `None`.
    pub fn new(
        api_key: Option<String>,
        voice_id: String,
        model_id: String,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SYNTHESIS_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            voice_id,
            model_id,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTts {
    fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, text: &str) -> Option<String> {
        let api_key = self.api_key.as_deref()?;
        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}",
            self.voice_id
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .json(&serde_json::json!({ "text": text, "model_id": self.model_id }))
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "speech synthesis request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(status = %response.status(), "speech synthesis request rejected");
            return None;
        }

        match response.bytes().await {
            Ok(audio) => {
                debug!(bytes = audio.len(), "synthesized speech audio");
                Some(base64::engine::general_purpose::STANDARD.encode(&audio))
            }
            Err(e) => {
                warn!(error = %e, "failed to read synthesized audio");
                None
            }
        }
    }
}
