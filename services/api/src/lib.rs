//! Parla API Library Crate
//!
//! This library contains all the core logic for the Parla speech-practice
//! service: configuration, the REST handlers and router, pronunciation
//! scoring, speech synthesis, and the websocket relay that drives live
//! practice sessions. The binaries are thin wrappers around this library.

pub mod catalog;
pub mod config;
pub mod handlers;
pub mod prompts;
pub mod router;
pub mod scoring;
pub mod state;
pub mod tts;
pub mod ws;
