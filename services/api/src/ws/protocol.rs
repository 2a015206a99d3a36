//! Defines the WebSocket message protocol between the browser client and the API server.

use serde::{Deserialize, Serialize};

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// One base64-encoded chunk of PCM16 microphone audio.
    AudioChunk { data: String },
    /// Marks the end of the user's spoken turn.
    EndTurn,
    /// Announces which theme and scenario the user wants to practice.
    /// Only acted on when both fields are present.
    Preference {
        theme: Option<String>,
        scenario: Option<String>,
    },
    /// Starts a fresh practice round, optionally scoped to a theme and
    /// scenario. Unpauses the session and discards buffered audio.
    StartPractice {
        theme: Option<String>,
        scenario: Option<String>,
    },
    /// Pauses or resumes audio forwarding.
    Control { action: ControlAction },
}

/// The two session control actions a client can request.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Pause,
    Resume,
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Lifecycle notices such as `connected` and `voice-enabled`.
    Status { message: String },
    /// An incremental fragment of the model's reply.
    PartialResponse { text: String },
    /// The model's completed turn, optionally carrying a pronunciation
    /// score and synthesized speech audio (base64 MP3).
    FinalResponse {
        text: String,
        paused: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<String>,
    },
    /// The pause flag after a completed turn.
    PauseState { paused: bool },
    /// The upstream model connection went away.
    GeminiDisconnected { code: u16, reason: String },
    /// Reports a fatal error to the client.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_audio_chunk() {
        let command: ClientCommand =
            serde_json::from_str(r#"{"type":"audio-chunk","data":"QUJD"}"#).unwrap();
        assert!(matches!(command, ClientCommand::AudioChunk { data } if data == "QUJD"));
    }

    #[test]
    fn decodes_end_turn() {
        let command: ClientCommand = serde_json::from_str(r#"{"type":"end-turn"}"#).unwrap();
        assert!(matches!(command, ClientCommand::EndTurn));
    }

    #[test]
    fn decodes_control_actions() {
        let pause: ClientCommand =
            serde_json::from_str(r#"{"type":"control","action":"pause"}"#).unwrap();
        assert!(matches!(
            pause,
            ClientCommand::Control {
                action: ControlAction::Pause
            }
        ));

        let resume: ClientCommand =
            serde_json::from_str(r#"{"type":"control","action":"resume"}"#).unwrap();
        assert!(matches!(
            resume,
            ClientCommand::Control {
                action: ControlAction::Resume
            }
        ));

        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"control","action":"stop"}"#)
            .is_err());
    }

    #[test]
    fn decodes_start_practice_without_focus() {
        let command: ClientCommand =
            serde_json::from_str(r#"{"type":"start-practice"}"#).unwrap();
        match command {
            ClientCommand::StartPractice { theme, scenario } => {
                assert_eq!(theme, None);
                assert_eq!(scenario, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn decodes_preference_with_partial_fields() {
        let command: ClientCommand =
            serde_json::from_str(r#"{"type":"preference","theme":"travel"}"#).unwrap();
        match command {
            ClientCommand::Preference { theme, scenario } => {
                assert_eq!(theme.as_deref(), Some("travel"));
                assert_eq!(scenario, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_message_types() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"upload","data":"x"}"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(serde_json::from_str::<ClientCommand>("{oops").is_err());
    }

    #[test]
    fn final_response_omits_absent_extras() {
        let msg = ServerMessage::FinalResponse {
            text: "Well done---做得好".to_string(),
            paused: false,
            score: None,
            audio: None,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "final-response",
                "text": "Well done---做得好",
                "paused": false
            })
        );
    }

    #[test]
    fn final_response_carries_score_and_audio() {
        let msg = ServerMessage::FinalResponse {
            text: "ok".to_string(),
            paused: true,
            score: Some(87),
            audio: Some("bXAz".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "final-response",
                "text": "ok",
                "paused": true,
                "score": 87,
                "audio": "bXAz"
            })
        );
    }

    #[test]
    fn status_and_pause_state_wire_shape() {
        let status = ServerMessage::Status {
            message: "connected".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({ "type": "status", "message": "connected" })
        );

        let pause = ServerMessage::PauseState { paused: true };
        assert_eq!(
            serde_json::to_value(&pause).unwrap(),
            json!({ "type": "pause-state", "paused": true })
        );
    }

    #[test]
    fn disconnect_notice_wire_shape() {
        let msg = ServerMessage::GeminiDisconnected {
            code: 1000,
            reason: "bye".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "type": "gemini-disconnected", "code": 1000, "reason": "bye" })
        );
    }

    #[test]
    fn partial_response_wire_shape() {
        let msg = ServerMessage::PartialResponse {
            text: "Hel".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "type": "partial-response", "text": "Hel" })
        );
    }
}
