//! Unit tests for derived values shown by renderers.

use std::sync::Arc;

use rustinterval::audio::NullCueSink;
use rustinterval::ui::{format_clock, phase_label};
use rustinterval::workouts::engine::IntervalTimer;
use rustinterval::workouts::plan::PlanStore;
use rustinterval::workouts::progress::{
    overall_progress, progress, remaining_planned_time, remaining_time, total_planned_time,
};
use rustinterval::workouts::types::{Phase, SetConfig};

fn create_test_timer() -> IntervalTimer {
    let plan = PlanStore::from_sets(vec![SetConfig::new(60, 30, 2, 10)]).unwrap();
    IntervalTimer::new(plan, Arc::new(NullCueSink))
}

#[test]
fn test_idle_snapshot() {
    let timer = create_test_timer();
    let snapshot = timer.snapshot();

    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.display_seconds, 60);
    assert_eq!(snapshot.progress, 0.0);
    assert_eq!(snapshot.total_planned_time, 180.0);
    assert_eq!(snapshot.remaining_planned_time, 180.0);
    assert_eq!(phase_label(snapshot.phase), "READY");
}

#[test]
fn test_countdown_does_not_count_toward_elapsed() {
    let mut timer = create_test_timer();
    timer.start().unwrap();

    for _ in 0..50 {
        timer.tick(0.1);
    }

    let state = timer.state();
    assert_eq!(state.phase, Phase::Countdown);
    assert_eq!(state.elapsed_time, 0.0);
    assert!((progress(timer.plan(), state) - 0.5).abs() < 1e-9);
    assert_eq!(remaining_time(state), 5);
}

#[test]
fn test_mid_workout_values() {
    let mut timer = create_test_timer();
    timer.start().unwrap();

    // Countdown plus 17.7 s of work
    for _ in 0..(100 + 177) {
        timer.tick(0.1);
    }

    let plan = timer.plan();
    let state = timer.state();
    assert_eq!(state.phase, Phase::Workout);
    assert_eq!(remaining_time(state), 43);
    assert!((progress(plan, state) - 0.295).abs() < 1e-6);
    assert!((state.elapsed_time - 17.7).abs() < 1e-6);
    assert!((overall_progress(plan, state) - 17.7 / 180.0).abs() < 1e-6);
    assert!((remaining_planned_time(plan, state) - 162.3).abs() < 1e-6);
}

#[test]
fn test_display_never_shows_zero_while_active() {
    let mut timer = create_test_timer();
    timer.start().unwrap();

    for _ in 0..2000 {
        timer.tick(0.1);
        let state = timer.state();
        if state.phase != Phase::Idle {
            assert!(remaining_time(state) >= 1, "{:?}", state);
        }
    }
}

#[test]
fn test_completed_values() {
    let mut timer = create_test_timer();
    timer.start().unwrap();

    for _ in 0..(100 + 1800) {
        timer.tick(0.1);
    }

    let snapshot = timer.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(!snapshot.is_running);
    assert_eq!(snapshot.display_seconds, 0);
    assert!((snapshot.overall_progress - 1.0).abs() < 1e-6);
    assert!(snapshot.remaining_planned_time < 1e-6);
    assert_eq!(format_clock(snapshot.remaining_planned_time), "00:00");
}

#[test]
fn test_total_planned_time_tracks_edits() {
    let mut timer = create_test_timer();
    timer.add_set().unwrap();

    assert_eq!(total_planned_time(timer.plan()), 180.0 + 270.0);
}
