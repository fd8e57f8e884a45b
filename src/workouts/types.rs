//! Interval workout types and enums.
//!
//! Defines the set configuration held by the plan store, the phase enum,
//! the timer state owned by the engine, and the errors raised at the
//! engine boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds left in a phase at which the countdown cue starts firing.
pub const DEFAULT_COUNTDOWN_CUE_THRESHOLD: f64 = 3.0;

/// Largest delta a single tick may apply, in seconds.
pub const DEFAULT_MAX_TICK_DELTA: f64 = 1.0;

/// Remaining time at or below which a phase counts as finished.
///
/// Repeated 0.1 s subtractions leave residue in the last few bits; without
/// this tolerance a 10 s phase would take 101 ticks instead of 100.
pub const TIME_EPSILON: f64 = 1e-6;

/// Execution phase of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Not running; both the initial and the completion state
    #[default]
    Idle,
    /// Lead-in before the first round of a set
    Countdown,
    /// Work interval
    Workout,
    /// Rest interval
    Rest,
}

impl Phase {
    /// Whether time spent in this phase counts toward elapsed workout time.
    pub fn is_active_interval(&self) -> bool {
        matches!(self, Phase::Workout | Phase::Rest)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Countdown => write!(f, "Countdown"),
            Phase::Workout => write!(f, "Workout"),
            Phase::Rest => write!(f, "Rest"),
        }
    }
}

/// One configured block of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetConfig {
    /// Work interval length in seconds
    pub workout_duration: u32,
    /// Rest interval length in seconds
    pub rest_duration: u32,
    /// Number of work+rest rounds
    pub rounds: u32,
    /// Lead-in countdown in seconds (0 skips the countdown)
    pub initial_countdown: u32,
    /// Free-form notes shown alongside the timer
    pub details: String,
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            workout_duration: 60,
            rest_duration: 30,
            rounds: 3,
            initial_countdown: 10,
            details: String::new(),
        }
    }
}

impl SetConfig {
    /// Create a set with the given durations and no notes.
    pub fn new(
        workout_duration: u32,
        rest_duration: u32,
        rounds: u32,
        initial_countdown: u32,
    ) -> Self {
        Self {
            workout_duration,
            rest_duration,
            rounds,
            initial_countdown,
            details: String::new(),
        }
    }

    /// Attach notes to the set.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Planned work+rest time for the whole set, excluding the countdown.
    pub fn planned_seconds(&self) -> u64 {
        (self.workout_duration as u64 + self.rest_duration as u64) * self.rounds as u64
    }

    /// Check the positivity invariants.
    pub fn validate(&self) -> Result<(), TimerError> {
        if self.workout_duration == 0 {
            return Err(TimerError::InvalidSet(
                "workout duration must be positive".to_string(),
            ));
        }
        if self.rest_duration == 0 {
            return Err(TimerError::InvalidSet(
                "rest duration must be positive".to_string(),
            ));
        }
        if self.rounds == 0 {
            return Err(TimerError::InvalidSet(
                "a set needs at least one round".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update merged into a [`SetConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetUpdate {
    pub workout_duration: Option<u32>,
    pub rest_duration: Option<u32>,
    pub rounds: Option<u32>,
    pub initial_countdown: Option<u32>,
    pub details: Option<String>,
}

impl SetUpdate {
    pub fn workout(mut self, seconds: u32) -> Self {
        self.workout_duration = Some(seconds);
        self
    }

    pub fn rest(mut self, seconds: u32) -> Self {
        self.rest_duration = Some(seconds);
        self
    }

    pub fn rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }

    pub fn countdown(mut self, seconds: u32) -> Self {
        self.initial_countdown = Some(seconds);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == SetUpdate::default()
    }
}

/// Inclusive bounds applied to plan edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetLimits {
    pub min_countdown: u32,
    pub max_countdown: u32,
    pub min_workout: u32,
    pub max_workout: u32,
    pub min_rest: u32,
    pub max_rest: u32,
    pub min_rounds: u32,
    pub max_rounds: u32,
}

impl Default for SetLimits {
    fn default() -> Self {
        Self {
            min_countdown: 0,
            max_countdown: 180,
            min_workout: 10,
            max_workout: 180,
            min_rest: 5,
            max_rest: 180,
            min_rounds: 1,
            max_rounds: 10,
        }
    }
}

impl SetLimits {
    /// Pull every field of `set` into range.
    ///
    /// Lower bounds never go below the positivity invariants, even if the
    /// configured limits say otherwise.
    pub fn clamp(&self, set: &mut SetConfig) {
        set.initial_countdown = self.clamp_countdown(set.initial_countdown);
        set.workout_duration = self.clamp_workout(set.workout_duration);
        set.rest_duration = self.clamp_rest(set.rest_duration);
        set.rounds = self.clamp_rounds(set.rounds);
    }

    pub fn clamp_countdown(&self, seconds: u32) -> u32 {
        clamp_u32(seconds, self.min_countdown, self.max_countdown)
    }

    pub fn clamp_workout(&self, seconds: u32) -> u32 {
        clamp_u32(seconds, self.min_workout.max(1), self.max_workout)
    }

    pub fn clamp_rest(&self, seconds: u32) -> u32 {
        clamp_u32(seconds, self.min_rest.max(1), self.max_rest)
    }

    pub fn clamp_rounds(&self, rounds: u32) -> u32 {
        clamp_u32(rounds, self.min_rounds.max(1), self.max_rounds)
    }
}

fn clamp_u32(value: u32, min: u32, max: u32) -> u32 {
    value.max(min).min(max.max(min))
}

/// Countdown cue repeat policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownCueMode {
    /// One cue per whole second crossed inside the window
    #[default]
    PerSecond,
    /// One cue on every tick inside the window
    EveryTick,
}

/// Mutable state owned by the phase engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    /// Index of the set being executed or selected
    pub current_set_index: usize,
    /// One-based round within the current set
    pub current_round: u32,
    /// Current phase
    pub phase: Phase,
    /// Seconds left in the current phase
    pub time_left: f64,
    /// Whether the driver is advancing the timer
    pub is_running: bool,
    /// Seconds spent in workout and rest phases
    pub elapsed_time: f64,
}

impl TimerState {
    /// Initial idle state for a plan whose first set is `first`.
    pub fn idle(first: &SetConfig) -> Self {
        Self {
            current_set_index: 0,
            current_round: 1,
            phase: Phase::Idle,
            time_left: first.workout_duration as f64,
            is_running: false,
            elapsed_time: 0.0,
        }
    }
}

/// Audio cue requested by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Last seconds of a phase
    Countdown,
    /// Entering a new phase
    PhaseChange,
    /// Whole plan finished
    Completion,
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cue::Countdown => write!(f, "countdown"),
            Cue::PhaseChange => write!(f, "phase change"),
            Cue::Completion => write!(f, "completion"),
        }
    }
}

/// A phase transition taken during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub set_index: usize,
    pub round: u32,
}

/// A cue that the sink refused; the tick still completed.
#[derive(Debug, Clone, PartialEq)]
pub struct CueFailure {
    pub cue: Cue,
    pub message: String,
}

/// Everything a single tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Transition taken, if the phase ran out
    pub transition: Option<Transition>,
    /// Cues that were dispatched
    pub cues: Vec<Cue>,
    /// Cues the sink rejected
    pub cue_failures: Vec<CueFailure>,
}

impl TickOutcome {
    /// Whether this tick finished the plan.
    pub fn completed(&self) -> bool {
        matches!(self.transition, Some(t) if t.to == Phase::Idle)
    }
}

/// Errors raised by plan edits and engine commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimerError {
    /// Plan edits are refused while the timer runs
    #[error("Plan cannot be edited while the timer is running")]
    TimerRunning,

    /// Set index does not exist
    #[error("Set index {index} out of range (plan has {len} sets)")]
    SetIndexOutOfRange { index: usize, len: usize },

    /// Removing the only set
    #[error("Plan must keep at least one set")]
    LastSet,

    /// Plan with no sets
    #[error("Plan has no sets")]
    EmptyPlan,

    /// Set values violate an invariant
    #[error("Invalid set: {0}")]
    InvalidSet(String),

    /// Command not valid in the current phase
    #[error("Cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
}
