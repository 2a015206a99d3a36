//! Wire types for the BidiGenerateContent websocket protocol.
//!
//! Outbound messages use the snake_case field names of the v1alpha wire
//! format; inbound messages arrive in camelCase.

use serde::{Deserialize, Serialize};

/// Mime type attached to streamed microphone chunks.
pub(crate) const AUDIO_MIME_TYPE: &str = "audio/pcm";

/// A decoded event from the live server stream.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// Incremental fragment of the model's reply for the current turn.
    TextDelta { text: String },
    /// The model finished its turn. Carries every fragment of the turn,
    /// joined in arrival order.
    TurnComplete { full_text: String },
    /// The connection ended. `graceful` distinguishes a deliberate server
    /// close from a dropped link.
    Disconnected {
        code: u16,
        reason: String,
        graceful: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ClientMessage {
    Setup(Setup),
    ClientContent(ClientContent),
    RealtimeInput(RealtimeInput),
}

#[derive(Serialize)]
pub(crate) struct Setup {
    pub model: String,
    pub generation_config: GenerationConfig,
}

#[derive(Serialize)]
pub(crate) struct GenerationConfig {
    pub response_modalities: Vec<ResponseModality>,
}

#[derive(Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum ResponseModality {
    Text,
}

#[derive(Serialize)]
pub(crate) struct ClientContent {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub turns: Vec<Content>,
    pub turn_complete: bool,
}

#[derive(Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Serialize)]
pub(crate) struct RealtimeInput {
    pub media_chunks: Vec<MediaChunk>,
}

#[derive(Serialize)]
pub(crate) struct MediaChunk {
    pub mime_type: String,
    pub data: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LiveServerMessage {
    pub setup_complete: Option<serde_json::Value>,
    pub server_content: Option<LiveServerContent>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LiveServerContent {
    pub model_turn: Option<ModelTurn>,
    pub turn_complete: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ModelTurn {
    #[serde(default)]
    pub parts: Vec<ModelPart>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ModelPart {
    pub text: Option<String>,
}
