//! Unit tests for the plan store.

use rustinterval::workouts::plan::PlanStore;
use rustinterval::workouts::types::{SetConfig, SetLimits, SetUpdate, TimerError};

#[test]
fn test_default_plan_has_one_set() {
    let plan = PlanStore::default();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.first(), &SetConfig::default());
    assert_eq!(plan.default_set(), &SetConfig::default());
}

#[test]
fn test_invalid_template_falls_back() {
    let plan = PlanStore::new(SetConfig::new(0, 30, 1, 10), SetLimits::default());

    assert_eq!(plan.default_set(), &SetConfig::default());
    assert_eq!(plan.len(), 1);
}

#[test]
fn test_from_sets_validation() {
    assert_eq!(PlanStore::from_sets(vec![]), Err(TimerError::EmptyPlan));
    assert!(matches!(
        PlanStore::from_sets(vec![SetConfig::new(30, 10, 0, 5)]),
        Err(TimerError::InvalidSet(_))
    ));
}

#[test]
fn test_add_set_uses_template() {
    let template = SetConfig::new(45, 15, 4, 5).with_details("Burpees");
    let mut plan = PlanStore::new(template.clone(), SetLimits::default());

    let index = plan.add_set();

    assert_eq!(index, 1);
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.get(1), Some(&template));
}

#[test]
fn test_remove_set() {
    let mut plan = PlanStore::from_sets(vec![
        SetConfig::new(30, 10, 1, 5),
        SetConfig::new(40, 10, 1, 5),
    ])
    .unwrap();

    let removed = plan.remove_set(0).unwrap();

    assert_eq!(removed.workout_duration, 30);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.first().workout_duration, 40);
}

#[test]
fn test_remove_last_set_refused() {
    let mut plan = PlanStore::default();

    assert_eq!(plan.remove_set(0), Err(TimerError::LastSet));
    assert_eq!(plan.len(), 1);
}

#[test]
fn test_remove_out_of_range() {
    let mut plan = PlanStore::default();
    plan.add_set();

    assert_eq!(
        plan.remove_set(7),
        Err(TimerError::SetIndexOutOfRange { index: 7, len: 2 })
    );
}

#[test]
fn test_update_set_merges_fields() {
    let mut plan = PlanStore::from_sets(vec![SetConfig::new(30, 10, 2, 5)]).unwrap();

    let updated = plan
        .update_set(0, SetUpdate::default().workout(50).details("Plank"))
        .unwrap()
        .clone();

    assert_eq!(updated.workout_duration, 50);
    assert_eq!(updated.rest_duration, 10);
    assert_eq!(updated.rounds, 2);
    assert_eq!(updated.details, "Plank");
}

#[test]
fn test_update_set_clamps_to_limits() {
    let mut plan = PlanStore::default();

    plan.update_set(
        0,
        SetUpdate::default()
            .workout(3)
            .rest(600)
            .rounds(25)
            .countdown(200),
    )
    .unwrap();

    let set = plan.first();
    assert_eq!(set.workout_duration, 10);
    assert_eq!(set.rest_duration, 180);
    assert_eq!(set.rounds, 10);
    assert_eq!(set.initial_countdown, 180);
}

#[test]
fn test_update_set_rejects_zero() {
    let mut plan = PlanStore::default();

    assert!(plan.update_set(0, SetUpdate::default().workout(0)).is_err());
    assert!(plan.update_set(0, SetUpdate::default().rest(0)).is_err());
    assert!(plan.update_set(0, SetUpdate::default().rounds(0)).is_err());
    assert!(plan.update_set(0, SetUpdate::default().countdown(0)).is_ok());
    assert_eq!(plan.first().workout_duration, 60);
}

#[test]
fn test_custom_limits() {
    let limits = SetLimits {
        max_rounds: 3,
        ..SetLimits::default()
    };
    let mut plan = PlanStore::default().with_limits(limits);

    plan.update_set(0, SetUpdate::default().rounds(8)).unwrap();

    assert_eq!(plan.first().rounds, 3);
}

#[test]
fn test_reset_restores_single_default() {
    let mut plan = PlanStore::default();
    plan.add_set();
    plan.add_set();
    plan.update_set(0, SetUpdate::default().workout(20)).unwrap();

    plan.reset();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.first(), &SetConfig::default());
}

#[test]
fn test_total_planned_seconds() {
    let plan = PlanStore::from_sets(vec![
        SetConfig::new(60, 30, 2, 10),
        SetConfig::new(20, 10, 3, 0),
    ])
    .unwrap();

    assert_eq!(plan.total_planned_seconds(), 180 + 90);
}

#[test]
fn test_get_clamped_falls_back_to_last() {
    let plan = PlanStore::from_sets(vec![
        SetConfig::new(30, 10, 1, 5),
        SetConfig::new(40, 10, 1, 5),
    ])
    .unwrap();

    assert_eq!(plan.get_clamped(9).workout_duration, 40);
    assert!(plan.get(9).is_none());
}
