//! Tone patterns for timer cues.

use std::time::Duration;

use rodio::source::{SineWave, Zero};
use rodio::{Sink, Source};

use crate::workouts::types::Cue;

/// Tone frequencies in Hz.
pub mod frequencies {
    /// Countdown beep
    pub const COUNTDOWN: f32 = 440.0; // A4
    /// First half of the phase change chime
    pub const PHASE_HIGH: f32 = 880.0; // A5
    /// Second half of the phase change chime
    pub const PHASE_LOW: f32 = 660.0; // E5
    /// Completion fanfare, low to high
    pub const COMPLETE_LOW: f32 = 660.0;
    pub const COMPLETE_MID: f32 = 880.0;
    pub const COMPLETE_HIGH: f32 = 1320.0; // E6
}

/// Tone durations in milliseconds.
pub mod durations {
    pub const BEEP: u64 = 100;
    pub const CHIME: u64 = 150;
    pub const GAP: u64 = 50;
    pub const LONG: u64 = 400;
}

/// Sample rate used for silent gaps.
const GAP_SAMPLE_RATE: u32 = 48_000;

/// Tone sequence played for one cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuePattern {
    /// Single short beep
    CountdownTick,
    /// High then low chime
    PhaseChange,
    /// Ascending triple
    Completion,
}

impl From<Cue> for CuePattern {
    fn from(cue: Cue) -> Self {
        match cue {
            Cue::Countdown => CuePattern::CountdownTick,
            Cue::PhaseChange => CuePattern::PhaseChange,
            Cue::Completion => CuePattern::Completion,
        }
    }
}

impl CuePattern {
    /// Get the tone sequence for this pattern.
    pub fn tones(&self) -> Vec<Tone> {
        match self {
            CuePattern::CountdownTick => vec![Tone::new(frequencies::COUNTDOWN, durations::BEEP)],

            CuePattern::PhaseChange => vec![
                Tone::new(frequencies::PHASE_HIGH, durations::CHIME),
                Tone::pause(durations::GAP),
                Tone::new(frequencies::PHASE_LOW, durations::CHIME),
            ],

            CuePattern::Completion => vec![
                Tone::new(frequencies::COMPLETE_LOW, durations::CHIME),
                Tone::pause(durations::GAP),
                Tone::new(frequencies::COMPLETE_MID, durations::CHIME),
                Tone::pause(durations::GAP),
                Tone::new(frequencies::COMPLETE_HIGH, durations::LONG),
            ],
        }
    }

    /// Get total duration of the pattern in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.tones().iter().map(|t| t.duration_ms).sum()
    }

    /// Queue the whole pattern on `sink`.
    pub fn append_to(&self, sink: &Sink) {
        for tone in self.tones() {
            let duration = Duration::from_millis(tone.duration_ms);
            if tone.is_pause() {
                sink.append(Zero::<f32>::new(1, GAP_SAMPLE_RATE).take_duration(duration));
            } else {
                sink.append(SineWave::new(tone.frequency_hz).take_duration(duration));
            }
        }
    }
}

/// A single tone with frequency and duration.
#[derive(Debug, Clone, Copy)]
pub struct Tone {
    /// Frequency in Hz (0 for silence)
    pub frequency_hz: f32,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl Tone {
    pub fn new(frequency_hz: f32, duration_ms: u64) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    /// Create a pause (silence).
    pub fn pause(duration_ms: u64) -> Self {
        Self {
            frequency_hz: 0.0,
            duration_ms,
        }
    }

    pub fn is_pause(&self) -> bool {
        self.frequency_hz <= 0.0
    }
}
