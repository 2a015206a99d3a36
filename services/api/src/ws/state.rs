//! Mutable state shared by the two relay loops of one conversation.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Saying this mid-turn pauses the session.
pub const PAUSE_TRIGGER: &str = "can i have a break";
/// Saying this mid-turn resumes a paused session.
pub const RESUME_TRIGGER: &str = "ok let's continue";

/// Per-conversation flags and buffers.
///
/// Both relay loops touch this concurrently. The pause flag is
/// last-write-wins; the audio buffer collects raw PCM between turn
/// boundaries and is drained in a single step when a turn completes.
#[derive(Default)]
pub struct SessionState {
    paused: AtomicBool,
    audio_buffer: Mutex<Vec<u8>>,
}

impl SessionState {
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    /// Appends one decoded audio chunk to the turn buffer.
    pub fn push_audio(&self, chunk: &[u8]) {
        let mut buffer = self
            .audio_buffer
            .lock()
            .expect("audio buffer mutex poisoned");
        buffer.extend_from_slice(chunk);
    }

    /// Takes the buffered audio for the finished turn, leaving it empty.
    pub fn drain_audio(&self) -> Vec<u8> {
        let mut buffer = self
            .audio_buffer
            .lock()
            .expect("audio buffer mutex poisoned");
        std::mem::take(&mut *buffer)
    }

    /// Applies the spoken pause and resume triggers to the pause flag and
    /// returns its resulting value. Matching is case-insensitive; when a
    /// turn contains both phrases, pausing wins.
    pub fn apply_turn_triggers(&self, turn_text: &str) -> bool {
        let lowered = turn_text.to_lowercase();
        if lowered.contains(PAUSE_TRIGGER) {
            self.set_paused(true);
        } else if lowered.contains(RESUME_TRIGGER) {
            self.set_paused(false);
        }
        self.is_paused()
    }
}
