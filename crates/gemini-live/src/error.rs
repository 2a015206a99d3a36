use tokio_tungstenite::tungstenite;

/// Errors produced while establishing or using a live session.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// The websocket connection could not be established.
    #[error("failed to connect to live endpoint: {0}")]
    Connect(#[source] tungstenite::Error),

    /// The HTTP CONNECT tunnel to the proxy could not be established.
    #[error("proxy tunnel failed: {0}")]
    Proxy(String),

    /// The server did not acknowledge the setup message in time.
    #[error("handshake with live endpoint timed out")]
    HandshakeTimeout,

    /// The server replied to setup with something other than an acknowledgement.
    #[error("unexpected handshake reply from live endpoint")]
    Handshake,

    /// A message could not be delivered on the established connection.
    #[error("failed to send to live endpoint: {0}")]
    Send(#[source] tungstenite::Error),

    /// An outbound payload failed to serialize.
    #[error("failed to encode outbound payload: {0}")]
    Encode(#[from] serde_json::Error),
}
