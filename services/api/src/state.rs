//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared,
//! clonable resources handed to every connection.

use crate::config::Config;
use crate::tts::SpeechSynthesizer;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub tts: Arc<dyn SpeechSynthesizer>,
    pub config: Arc<Config>,
}
