//! Client for the Gemini Live (BidiGenerateContent) streaming API.
//!
//! Wraps the websocket transport in a typed interface: [`LiveSession::connect`]
//! runs the setup handshake and delivers the system instructions, then the
//! session splits into a clonable [`LiveHandle`] for outbound text and audio
//! and a [`LiveEvents`] stream yielding decoded [`LiveEvent`]s. A background
//! task pings the server every [`KEEPALIVE_INTERVAL`] to keep long-idle
//! sessions alive.

mod error;
mod proxy;
mod session;
mod types;

pub use error::LiveError;
pub use session::{
    DEFAULT_HOST, HANDSHAKE_TIMEOUT, KEEPALIVE_INTERVAL, LiveConfig, LiveEvents, LiveHandle,
    LiveSession,
};
pub use types::LiveEvent;
