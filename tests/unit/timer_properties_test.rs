//! Property tests for the plan store and the phase engine.

use std::sync::Arc;

use proptest::prelude::*;

use rustinterval::audio::{NullCueSink, RecordingCueSink};
use rustinterval::workouts::engine::IntervalTimer;
use rustinterval::workouts::plan::PlanStore;
use rustinterval::workouts::progress::progress;
use rustinterval::workouts::types::{Cue, Phase, SetConfig, TimerState};

fn set_strategy() -> impl Strategy<Value = SetConfig> {
    (1u32..20, 1u32..20, 1u32..4, 0u32..6).prop_map(|(workout, rest, rounds, countdown)| {
        SetConfig::new(workout, rest, rounds, countdown)
    })
}

fn phase_strategy() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Idle),
        Just(Phase::Countdown),
        Just(Phase::Workout),
        Just(Phase::Rest),
    ]
}

#[derive(Debug, Clone)]
enum PlanOp {
    Add,
    Remove(usize),
}

fn plan_op_strategy() -> impl Strategy<Value = PlanOp> {
    prop_oneof![Just(PlanOp::Add), (0usize..8).prop_map(PlanOp::Remove)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn progress_stays_in_unit_range(
        set in set_strategy(),
        phase in phase_strategy(),
        time_left in -100.0f64..1000.0,
    ) {
        let plan = PlanStore::from_sets(vec![set]).unwrap();
        let state = TimerState {
            current_set_index: 0,
            current_round: 1,
            phase,
            time_left,
            is_running: true,
            elapsed_time: 0.0,
        };

        let value = progress(&plan, &state);
        prop_assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn plan_never_empty(ops in proptest::collection::vec(plan_op_strategy(), 0..40)) {
        let mut plan = PlanStore::default();
        for op in ops {
            match op {
                PlanOp::Add => {
                    plan.add_set();
                }
                PlanOp::Remove(index) => {
                    let _ = plan.remove_set(index);
                }
            }
            prop_assert!(plan.len() >= 1);
        }
    }

    #[test]
    fn full_run_takes_planned_time(sets in proptest::collection::vec(set_strategy(), 1..4)) {
        let planned_ticks: u64 = sets
            .iter()
            .map(|s| 10 * (s.initial_countdown as u64 + s.planned_seconds()))
            .sum();
        let planned_active = sets.iter().map(SetConfig::planned_seconds).sum::<u64>() as f64;

        let sink = Arc::new(RecordingCueSink::new());
        let plan = PlanStore::from_sets(sets).unwrap();
        let mut timer = IntervalTimer::new(plan, sink.clone());
        timer.start().unwrap();

        let mut ticks = 0u64;
        while timer.is_running() && ticks <= planned_ticks + 10 {
            timer.tick(0.1);
            ticks += 1;
        }

        prop_assert_eq!(ticks, planned_ticks);
        prop_assert_eq!(timer.phase(), Phase::Idle);
        prop_assert!((timer.state().elapsed_time - planned_active).abs() < 1e-6);
        prop_assert_eq!(sink.count(Cue::Completion), 1);
    }

    #[test]
    fn ticks_before_start_change_nothing(
        set in set_strategy(),
        deltas in proptest::collection::vec(0.0f64..5.0, 1..50),
    ) {
        let plan = PlanStore::from_sets(vec![set]).unwrap();
        let mut timer = IntervalTimer::new(plan, Arc::new(NullCueSink));
        let before = timer.state().clone();

        for delta in deltas {
            let outcome = timer.tick(delta);
            prop_assert!(outcome.transition.is_none());
        }

        prop_assert_eq!(timer.state(), &before);
    }
}
