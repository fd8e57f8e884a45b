//! Derived values for presentation.
//!
//! Pure functions of the plan and the timer state. Nothing here is cached;
//! callers recompute after every tick or edit.

use serde::{Deserialize, Serialize};

use crate::workouts::plan::PlanStore;
use crate::workouts::types::{Phase, SetConfig, TimerState, TIME_EPSILON};

/// Full length of `phase` for `set`, in seconds.
///
/// `Idle` reports the workout length so an idle display shows a full work
/// interval.
pub fn duration_of(set: &SetConfig, phase: Phase) -> f64 {
    match phase {
        Phase::Workout | Phase::Idle => set.workout_duration as f64,
        Phase::Rest => set.rest_duration as f64,
        Phase::Countdown => set.initial_countdown as f64,
    }
}

/// Fraction of the current phase already done, in `[0, 1]`.
pub fn progress(plan: &PlanStore, state: &TimerState) -> f64 {
    let set = plan.get_clamped(state.current_set_index);
    let duration = duration_of(set, state.phase);
    if duration <= 0.0 {
        return 1.0;
    }

    let value = 1.0 - state.time_left / duration;
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Planned work+rest seconds for the whole plan, countdowns excluded.
pub fn total_planned_time(plan: &PlanStore) -> f64 {
    plan.total_planned_seconds() as f64
}

/// Whole seconds to show for `time_left`.
pub fn remaining_time(state: &TimerState) -> u64 {
    let seconds = (state.time_left - TIME_EPSILON).ceil();
    if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    }
}

/// Fraction of the planned work+rest time already spent, in `[0, 1]`.
pub fn overall_progress(plan: &PlanStore, state: &TimerState) -> f64 {
    let total = total_planned_time(plan);
    if total <= 0.0 {
        return 0.0;
    }
    (state.elapsed_time / total).clamp(0.0, 1.0)
}

/// Planned work+rest seconds not yet spent.
pub fn remaining_planned_time(plan: &PlanStore, state: &TimerState) -> f64 {
    (total_planned_time(plan) - state.elapsed_time).max(0.0)
}

/// Everything a renderer reads after a tick or an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub is_running: bool,
    /// Whole seconds shown on the dial
    pub display_seconds: u64,
    /// Raw seconds left in the phase
    pub time_left: f64,
    /// Phase progress (0.0 to 1.0)
    pub progress: f64,
    pub current_round: u32,
    pub total_rounds: u32,
    /// Zero-based
    pub current_set_index: usize,
    pub total_sets: usize,
    pub total_planned_time: f64,
    pub elapsed_time: f64,
    /// Plan progress (0.0 to 1.0)
    pub overall_progress: f64,
    pub remaining_planned_time: f64,
    /// Notes for the current set
    pub details: String,
}

impl TimerSnapshot {
    /// Compute every presentation value from the plan and state.
    pub fn capture(plan: &PlanStore, state: &TimerState) -> Self {
        let set = plan.get_clamped(state.current_set_index);

        Self {
            phase: state.phase,
            is_running: state.is_running,
            display_seconds: remaining_time(state),
            time_left: state.time_left.max(0.0),
            progress: progress(plan, state),
            current_round: state.current_round,
            total_rounds: set.rounds,
            current_set_index: state.current_set_index,
            total_sets: plan.len(),
            total_planned_time: total_planned_time(plan),
            elapsed_time: state.elapsed_time,
            overall_progress: overall_progress(plan, state),
            remaining_planned_time: remaining_planned_time(plan, state),
            details: set.details.clone(),
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        let plan = PlanStore::default();
        let state = TimerState::idle(plan.first());
        Self::capture(&plan, &state)
    }
}
