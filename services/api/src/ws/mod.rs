//! WebSocket Session Management
//!
//! This module contains the core logic for relaying practice conversations
//! over WebSockets. It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `transport`: Shares the outbound half of the client socket between tasks.
//! - `state`: Holds the pause flag and audio buffer a conversation accumulates.
//! - `relay`: Runs the two forwarding loops between client and model.
//! - `session`: Manages the WebSocket connection lifecycle, from upgrade to termination.

pub mod protocol;
mod relay;
pub mod session;
mod state;
mod transport;

pub use session::ws_handler;
