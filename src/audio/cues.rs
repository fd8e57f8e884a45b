//! Cue sink contract.
//!
//! The engine hands cues to a sink and never waits on them. Sinks report
//! refusals as [`AudioError`]; the engine records those and carries on.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::AudioError;
use crate::workouts::types::Cue;

/// Receiver of timer cues.
pub trait CueSink: Send + Sync {
    /// Dispatch `cue`. Must return promptly; playback happens elsewhere.
    fn cue(&self, cue: Cue) -> Result<(), AudioError>;

    fn on_countdown_cue(&self) -> Result<(), AudioError> {
        self.cue(Cue::Countdown)
    }

    fn on_phase_change_cue(&self) -> Result<(), AudioError> {
        self.cue(Cue::PhaseChange)
    }

    fn on_completion_cue(&self) -> Result<(), AudioError> {
        self.cue(Cue::Completion)
    }
}

/// Sink that drops every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCueSink;

impl CueSink for NullCueSink {
    fn cue(&self, _cue: Cue) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Sink that remembers cues, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingCueSink {
    cues: Mutex<Vec<Cue>>,
    failing: Mutex<bool>,
}

impl RecordingCueSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent cue fail after being recorded.
    pub fn set_failing(&self, failing: bool) {
        *lock(&self.failing) = failing;
    }

    /// Cues received so far, in order.
    pub fn cues(&self) -> Vec<Cue> {
        lock(&self.cues).clone()
    }

    /// How many times `cue` was received.
    pub fn count(&self, cue: Cue) -> usize {
        lock(&self.cues).iter().filter(|c| **c == cue).count()
    }

    pub fn clear(&self) {
        lock(&self.cues).clear();
    }
}

impl CueSink for RecordingCueSink {
    fn cue(&self, cue: Cue) -> Result<(), AudioError> {
        lock(&self.cues).push(cue);
        if *lock(&self.failing) {
            return Err(AudioError::PlaybackFailed(format!("{} cue rejected", cue)));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
