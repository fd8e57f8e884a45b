//! Interval timer execution engine.
//!
//! Owns the plan and the timer state. `start()`, `pause()`, `resume()` and
//! `reset()` drive the lifecycle; `tick()` advances time and applies at most
//! one phase transition per call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::cues::CueSink;
use crate::workouts::plan::PlanStore;
use crate::workouts::progress::{self, TimerSnapshot};
use crate::workouts::types::{
    CountdownCueMode, Cue, CueFailure, Phase, SetConfig, SetUpdate, TickOutcome, TimerError,
    TimerState, Transition, DEFAULT_COUNTDOWN_CUE_THRESHOLD, DEFAULT_MAX_TICK_DELTA, TIME_EPSILON,
};

/// Tunables for tick processing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Countdown cue window, in seconds before the end of a phase
    pub countdown_cue_threshold_secs: f64,
    /// How often the countdown cue repeats inside the window
    pub countdown_cue_mode: CountdownCueMode,
    /// Largest delta applied by a single tick
    pub max_tick_delta_secs: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            countdown_cue_threshold_secs: DEFAULT_COUNTDOWN_CUE_THRESHOLD,
            countdown_cue_mode: CountdownCueMode::PerSecond,
            max_tick_delta_secs: DEFAULT_MAX_TICK_DELTA,
        }
    }
}

/// Interval timer state machine.
///
/// Phases run `Idle -> Countdown -> Workout -> Rest -> Workout ... -> Idle`.
/// After the last round of a set the next set's countdown begins; after the
/// last set the timer returns to `Idle` and stops.
pub struct IntervalTimer {
    /// Ordered sets
    plan: PlanStore,
    /// Execution state, only written here
    state: TimerState,
    /// Cue collaborator
    cues: Arc<dyn CueSink>,
    settings: EngineSettings,
    /// Whole second last announced by the countdown cue in this phase
    last_countdown_second: Option<u32>,
}

impl IntervalTimer {
    /// Create an idle timer over `plan`.
    pub fn new(plan: PlanStore, cues: Arc<dyn CueSink>) -> Self {
        let state = TimerState::idle(plan.first());
        Self {
            plan,
            state,
            cues,
            settings: EngineSettings::default(),
            last_countdown_second: None,
        }
    }

    /// Override the tick settings.
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Start the plan from its first set.
    ///
    /// The outcome carries the phase-change cue fired when the first set has
    /// no countdown, and any failure to deliver it.
    pub fn start(&mut self) -> Result<TickOutcome, TimerError> {
        if self.state.phase != Phase::Idle || self.state.is_running {
            tracing::warn!("Start ignored: timer already active");
            return Err(TimerError::InvalidTransition {
                action: "start",
                phase: self.state.phase,
            });
        }

        self.state.current_set_index = 0;
        self.state.current_round = 1;
        self.state.elapsed_time = 0.0;
        self.state.is_running = true;
        self.last_countdown_second = None;

        let mut outcome = TickOutcome::default();
        self.enter_countdown(&mut outcome);

        tracing::info!(
            "Timer started: {} sets, {}s planned",
            self.plan.len(),
            self.plan.total_planned_seconds()
        );
        Ok(outcome)
    }

    /// Freeze the timer. Pausing a stopped timer does nothing.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        if !self.state.is_running {
            return Ok(());
        }

        self.state.is_running = false;
        tracing::info!(
            "Timer paused in {} with {:.1}s left",
            self.state.phase,
            self.state.time_left
        );
        Ok(())
    }

    /// Continue a paused run without touching any counters.
    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.state.is_running || self.state.phase == Phase::Idle {
            tracing::warn!("Resume ignored in {}", self.state.phase);
            return Err(TimerError::InvalidTransition {
                action: "resume",
                phase: self.state.phase,
            });
        }

        self.state.is_running = true;
        tracing::info!("Timer resumed");
        Ok(())
    }

    /// Stop and restore the single default set.
    pub fn reset(&mut self) {
        self.state.is_running = false;
        self.plan.reset();
        self.state = TimerState::idle(self.plan.first());
        self.last_countdown_second = None;
        tracing::info!("Timer reset");
    }

    /// Advance the timer by `delta_seconds`.
    ///
    /// Does nothing while stopped. Non-finite or non-positive deltas are
    /// ignored and large ones are clamped to `max_tick_delta_secs`.
    pub fn tick(&mut self, delta_seconds: f64) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if !self.state.is_running {
            return outcome;
        }
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            tracing::debug!("Ignoring tick with delta {}", delta_seconds);
            return outcome;
        }

        let delta = delta_seconds.min(self.settings.max_tick_delta_secs.max(TIME_EPSILON));
        let phase = self.state.phase;
        let time_before = self.state.time_left;

        self.countdown_cue(time_before, &mut outcome);

        self.state.time_left = time_before - delta;

        // Only the part of the delta the phase actually had left counts.
        if phase.is_active_interval() {
            self.state.elapsed_time += delta.min(time_before.max(0.0));
        }

        if self.state.time_left <= TIME_EPSILON {
            self.advance(&mut outcome);
        }

        outcome
    }

    /// Fire the countdown cue if `time_left` is inside the window.
    fn countdown_cue(&mut self, time_left: f64, outcome: &mut TickOutcome) {
        let threshold = self.settings.countdown_cue_threshold_secs;
        if time_left <= TIME_EPSILON || time_left > threshold + TIME_EPSILON {
            return;
        }

        match self.settings.countdown_cue_mode {
            CountdownCueMode::EveryTick => self.dispatch(Cue::Countdown, outcome),
            CountdownCueMode::PerSecond => {
                let second = (time_left - TIME_EPSILON).ceil().max(1.0) as u32;
                if self.last_countdown_second != Some(second) {
                    self.last_countdown_second = Some(second);
                    self.dispatch(Cue::Countdown, outcome);
                }
            }
        }
    }

    /// Apply the single transition out of the current phase.
    fn advance(&mut self, outcome: &mut TickOutcome) {
        let from = self.state.phase;
        self.last_countdown_second = None;

        match from {
            Phase::Countdown => {
                self.enter_workout();
                self.dispatch(Cue::PhaseChange, outcome);
            }
            Phase::Workout => {
                self.state.phase = Phase::Rest;
                self.state.time_left = self.current_set().rest_duration as f64;
                self.dispatch(Cue::PhaseChange, outcome);
            }
            Phase::Rest => {
                let rounds = self.current_set().rounds;
                if self.state.current_round < rounds {
                    self.state.current_round += 1;
                    self.enter_workout();
                    self.dispatch(Cue::PhaseChange, outcome);
                } else if self.state.current_set_index + 1 < self.plan.len() {
                    self.state.current_set_index += 1;
                    self.state.current_round = 1;
                    self.enter_countdown(outcome);
                } else {
                    self.state.phase = Phase::Idle;
                    self.state.time_left = 0.0;
                    self.state.is_running = false;
                    self.dispatch(Cue::Completion, outcome);
                    tracing::info!(
                        "Workout complete: {:.1}s of intervals",
                        self.state.elapsed_time
                    );
                }
            }
            Phase::Idle => {
                // A running timer is never idle; stop rather than spin.
                self.state.is_running = false;
                self.state.time_left = 0.0;
            }
        }

        let transition = Transition {
            from,
            to: self.state.phase,
            set_index: self.state.current_set_index,
            round: self.state.current_round,
        };
        tracing::debug!(
            "Transition {} -> {} (set {}, round {})",
            transition.from,
            transition.to,
            transition.set_index + 1,
            transition.round
        );
        outcome.transition = Some(transition);
    }

    /// Enter the current set's countdown, or go straight to work when the
    /// countdown is zero.
    fn enter_countdown(&mut self, outcome: &mut TickOutcome) {
        let countdown = self.current_set().initial_countdown;
        if countdown == 0 {
            self.enter_workout();
            self.dispatch(Cue::PhaseChange, outcome);
            return;
        }

        let starting = self.state.phase == Phase::Idle;
        self.state.phase = Phase::Countdown;
        self.state.time_left = countdown as f64;
        if !starting {
            self.dispatch(Cue::PhaseChange, outcome);
        }
    }

    fn enter_workout(&mut self) {
        self.state.phase = Phase::Workout;
        self.state.time_left = self.current_set().workout_duration as f64;
    }

    /// Hand a cue to the sink; failures are recorded and never propagate.
    fn dispatch(&self, cue: Cue, outcome: &mut TickOutcome) {
        outcome.cues.push(cue);
        if let Err(e) = self.cues.cue(cue) {
            tracing::warn!("Cue {} failed: {}", cue, e);
            outcome.cue_failures.push(CueFailure {
                cue,
                message: e.to_string(),
            });
        }
    }

    /// Append a default set and select it.
    pub fn add_set(&mut self) -> Result<usize, TimerError> {
        self.ensure_editable()?;
        let index = self.plan.add_set();
        if self.state.phase == Phase::Idle {
            self.state.current_set_index = index;
            self.state.current_round = 1;
        }
        self.sync_after_edit();
        Ok(index)
    }

    /// Remove a set, keeping the current index on a valid set.
    ///
    /// Outside Idle the set in progress cannot be removed; doing so would
    /// leave the index on a set that has already finished.
    pub fn remove_set(&mut self, index: usize) -> Result<SetConfig, TimerError> {
        self.ensure_editable()?;
        if self.state.phase != Phase::Idle && index == self.state.current_set_index {
            tracing::warn!("Refused to remove set {} while it is in progress", index);
            return Err(TimerError::InvalidTransition {
                action: "remove the current set",
                phase: self.state.phase,
            });
        }
        let removed = self.plan.remove_set(index)?;
        if self.state.current_set_index >= index {
            self.state.current_set_index = self.state.current_set_index.saturating_sub(1);
        }
        self.sync_after_edit();
        Ok(removed)
    }

    /// Merge `update` into the set at `index`.
    pub fn update_set(&mut self, index: usize, update: SetUpdate) -> Result<(), TimerError> {
        self.ensure_editable()?;
        self.plan.update_set(index, update)?;
        self.sync_after_edit();
        Ok(())
    }

    /// Make `index` the current set. Only possible while idle.
    pub fn select_set(&mut self, index: usize) -> Result<(), TimerError> {
        self.ensure_editable()?;
        if self.state.phase != Phase::Idle {
            return Err(TimerError::InvalidTransition {
                action: "select a set",
                phase: self.state.phase,
            });
        }
        if index >= self.plan.len() {
            return Err(TimerError::SetIndexOutOfRange {
                index,
                len: self.plan.len(),
            });
        }

        self.state.current_set_index = index;
        self.state.current_round = 1;
        self.sync_after_edit();
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), TimerError> {
        if self.state.is_running {
            tracing::warn!("Plan edit refused while running");
            return Err(TimerError::TimerRunning);
        }
        Ok(())
    }

    /// Re-establish state invariants after the plan changed.
    fn sync_after_edit(&mut self) {
        let last = self.plan.len().saturating_sub(1);
        self.state.current_set_index = self.state.current_set_index.min(last);

        let set = self.plan.get_clamped(self.state.current_set_index).clone();
        self.state.current_round = self.state.current_round.clamp(1, set.rounds.max(1));

        match self.state.phase {
            Phase::Idle => {
                self.state.time_left = set.workout_duration as f64;
            }
            Phase::Countdown if set.initial_countdown == 0 => {
                self.enter_workout();
            }
            phase => {
                let duration = progress::duration_of(&set, phase);
                self.state.time_left = self.state.time_left.min(duration);
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Current plan.
    pub fn plan(&self) -> &PlanStore {
        &self.plan
    }

    /// Set currently executing or selected.
    pub fn current_set(&self) -> &SetConfig {
        self.plan.get_clamped(self.state.current_set_index)
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Presentation values for the renderer.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::capture(&self.plan, &self.state)
    }
}
