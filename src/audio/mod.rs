//! Audio Cues Module
//!
//! Delivers countdown, phase change and completion cues from the timer
//! engine to the speakers.

pub mod cues;
pub mod engine;
pub mod tones;

use thiserror::Error;

use crate::workouts::types::Cue;

// Re-export main types
pub use cues::{CueSink, NullCueSink, RecordingCueSink};
pub use engine::ToneCueSink;
pub use tones::{CuePattern, Tone};

/// Errors that can occur during audio operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("Audio device not available")]
    DeviceNotAvailable,

    #[error("Cue queue is full")]
    QueueFull,

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Audio configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master enable for all cues
    pub enabled: bool,
    /// Output volume (0.0 - 1.0)
    pub volume: f32,
    /// Temporarily silence cues
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.3,
            muted: false,
        }
    }
}

impl AudioConfig {
    /// Whether cues should make any sound.
    pub fn is_audible(&self) -> bool {
        self.enabled && !self.muted && self.volume > 0.0
    }
}

/// Audio events for monitoring
#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// Cue pattern queued on the output device
    CuePlayed { cue: Cue },
    /// Audio error occurred
    Error { message: String },
}
