//! Audio Engine
//!
//! Cue playback using rodio on a dedicated thread. The engine side only
//! pushes onto a bounded channel, so dispatch never blocks a tick.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use rodio::{OutputStream, Sink};
use tokio::sync::broadcast;

use super::cues::CueSink;
use super::tones::CuePattern;
use super::{AudioConfig, AudioError, AudioEvent};
use crate::workouts::types::Cue;

/// Cues that may wait for the playback thread before dispatch fails.
const QUEUE_CAPACITY: usize = 16;

enum PlaybackCommand {
    Play(Cue),
    Shutdown,
}

/// Cue sink that plays tone patterns on the default output device.
pub struct ToneCueSink {
    config: Arc<Mutex<AudioConfig>>,
    tx: Sender<PlaybackCommand>,
    event_tx: broadcast::Sender<AudioEvent>,
}

impl ToneCueSink {
    /// Spawn the playback thread.
    ///
    /// If no output device can be opened the thread exits and every later
    /// cue reports [`AudioError::DeviceNotAvailable`]. The configured volume
    /// is clamped the same way as [`ToneCueSink::set_volume`].
    pub fn new(mut config: AudioConfig) -> Result<Self, AudioError> {
        config.volume = clamp_volume(config.volume);
        let (tx, rx) = channel::bounded(QUEUE_CAPACITY);
        let (event_tx, _) = broadcast::channel(100);
        let config = Arc::new(Mutex::new(config));

        let thread_config = Arc::clone(&config);
        let thread_events = event_tx.clone();
        thread::Builder::new()
            .name("cue-playback".to_string())
            .spawn(move || playback_loop(rx, thread_config, thread_events))
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;

        tracing::info!("Audio cue playback started");
        Ok(Self {
            config,
            tx,
            event_tx,
        })
    }

    /// Set the volume (0.0 - 1.0).
    pub fn set_volume(&self, volume: f32) {
        lock(&self.config).volume = clamp_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        lock(&self.config).volume
    }

    /// Flip mute and return the new state.
    pub fn toggle_mute(&self) -> bool {
        let mut config = lock(&self.config);
        config.muted = !config.muted;
        config.muted
    }

    pub fn is_muted(&self) -> bool {
        lock(&self.config).muted
    }

    /// Subscribe to audio events
    pub fn subscribe_events(&self) -> broadcast::Receiver<AudioEvent> {
        self.event_tx.subscribe()
    }
}

impl CueSink for ToneCueSink {
    fn cue(&self, cue: Cue) -> Result<(), AudioError> {
        if !lock(&self.config).is_audible() {
            return Ok(());
        }

        self.tx
            .try_send(PlaybackCommand::Play(cue))
            .map_err(|e| match e {
                TrySendError::Full(_) => AudioError::QueueFull,
                TrySendError::Disconnected(_) => AudioError::DeviceNotAvailable,
            })
    }
}

impl Drop for ToneCueSink {
    fn drop(&mut self) {
        let _ = self.tx.try_send(PlaybackCommand::Shutdown);
    }
}

fn playback_loop(
    rx: Receiver<PlaybackCommand>,
    config: Arc<Mutex<AudioConfig>>,
    events: broadcast::Sender<AudioEvent>,
) {
    // The stream must stay alive on this thread for as long as sinks play.
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("No audio output device: {}", e);
            let _ = events.send(AudioEvent::Error {
                message: e.to_string(),
            });
            return;
        }
    };

    for command in rx.iter() {
        let cue = match command {
            PlaybackCommand::Play(cue) => cue,
            PlaybackCommand::Shutdown => break,
        };

        let volume = {
            let config = lock(&config);
            if !config.is_audible() {
                continue;
            }
            config.volume
        };

        match Sink::try_new(&handle) {
            Ok(sink) => {
                sink.set_volume(volume);
                CuePattern::from(cue).append_to(&sink);
                sink.detach();
                let _ = events.send(AudioEvent::CuePlayed { cue });
            }
            Err(e) => {
                tracing::warn!("Cue playback failed: {}", e);
                let _ = events.send(AudioEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::debug!("Audio cue playback stopped");
}

/// NaN counts as silent.
fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
