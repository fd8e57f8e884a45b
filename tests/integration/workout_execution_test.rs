//! Integration tests for workout execution.
//!
//! Runs whole plans through a `TimerSession` on tokio's paused clock:
//! - Starting the driver and stepping through countdown, work and rest
//! - Pausing, editing and resuming mid-plan
//! - Watching snapshots as a renderer would

use std::sync::Arc;
use std::time::Duration;

use rustinterval::audio::RecordingCueSink;
use rustinterval::ui::{Renderer, TerminalRenderer};
use rustinterval::workouts::driver::{DriverSettings, TickMode, TimerSession};
use rustinterval::workouts::engine::IntervalTimer;
use rustinterval::workouts::plan::PlanStore;
use rustinterval::workouts::types::{Cue, Phase, SetConfig, SetUpdate, TimerError};

fn create_session(sets: Vec<SetConfig>, mode: TickMode) -> (TimerSession, Arc<RecordingCueSink>) {
    let sink = Arc::new(RecordingCueSink::new());
    let plan = PlanStore::from_sets(sets).expect("valid plan");
    let timer = IntervalTimer::new(plan, sink.clone());
    let settings = DriverSettings {
        mode,
        ..DriverSettings::default()
    };
    (TimerSession::new(timer, settings), sink)
}

async fn advance(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[tokio::test(start_paused = true)]
async fn test_two_set_plan_runs_to_completion() {
    let (mut session, sink) = create_session(
        vec![
            SetConfig::new(20, 10, 2, 5).with_details("Push-ups"),
            SetConfig::new(15, 5, 1, 3).with_details("Squats"),
        ],
        TickMode::Fixed,
    );

    session.start().unwrap();
    assert_eq!(session.snapshot().phase, Phase::Countdown);

    advance(5_050).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Workout);
    assert_eq!(snapshot.details, "Push-ups");

    // Both rounds of the first set
    advance(60_000).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Countdown);
    assert_eq!(snapshot.current_set_index, 1);
    assert_eq!(snapshot.details, "Squats");

    advance(3_000 + 20_000).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(!snapshot.is_running);
    assert!((snapshot.elapsed_time - 80.0).abs() < 1e-6);
    assert_eq!(sink.count(Cue::Completion), 1);
    assert!(!session.is_driving());
}

#[tokio::test(start_paused = true)]
async fn test_wall_clock_mode_tracks_time() {
    let (mut session, _sink) =
        create_session(vec![SetConfig::new(30, 10, 1, 0)], TickMode::WallClock);

    session.start().unwrap();
    advance(12_050).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Workout);
    assert_eq!(snapshot.display_seconds, 18);
}

#[tokio::test(start_paused = true)]
async fn test_pause_edit_resume() {
    let (mut session, _sink) = create_session(
        vec![SetConfig::new(30, 20, 3, 0), SetConfig::new(30, 20, 1, 0)],
        TickMode::Fixed,
    );

    session.start().unwrap();
    assert_eq!(session.add_set(), Err(TimerError::TimerRunning));

    advance(40_050).await;
    session.pause().unwrap();
    let paused = session.snapshot();
    assert_eq!(paused.phase, Phase::Rest);
    assert!(!paused.is_running);

    // Shorten the rest and drop the remaining rounds while paused
    session
        .update_set(0, SetUpdate::default().rest(5).rounds(1))
        .unwrap();
    let edited = session.snapshot();
    assert_eq!(edited.time_left, 5.0);
    assert_eq!(edited.total_rounds, 1);

    advance(10_000).await;
    assert_eq!(session.snapshot(), edited);

    session.resume().unwrap();
    advance(5_050).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Workout);
    assert_eq!(snapshot.current_set_index, 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_mid_run_stops_driver() {
    let (mut session, _sink) =
        create_session(vec![SetConfig::new(30, 10, 2, 5)], TickMode::Fixed);

    session.start().unwrap();
    session.add_set().unwrap_err();
    advance(8_000).await;

    session.reset();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.total_sets, 1);
    assert_eq!(snapshot.elapsed_time, 0.0);

    advance(5_000).await;
    assert_eq!(session.snapshot(), snapshot);
    assert!(!session.is_driving());

    // A fresh start after reset uses the restored default set
    session.start().unwrap();
    assert_eq!(session.snapshot().time_left, 10.0);
}

#[tokio::test(start_paused = true)]
async fn test_renderer_prints_each_second() {
    let (mut session, _sink) =
        create_session(vec![SetConfig::new(10, 5, 1, 3)], TickMode::Fixed);
    let mut rx = session.subscribe();
    let mut renderer = TerminalRenderer::new(Vec::new(), false);

    session.start().unwrap();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    loop {
        let snapshot = rx.borrow_and_update().clone();
        renderer.render(&snapshot).unwrap();
        if snapshot.phase == Phase::Idle && !snapshot.is_running {
            break;
        }
        tokio::select! {
            changed = rx.changed() => changed.unwrap(),
            _ = tokio::time::sleep_until(deadline) => panic!("plan did not finish"),
        }
    }

    let output = String::from_utf8(renderer.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    // 3 s countdown, 10 s work, 5 s rest, one line per shown second, then done
    assert_eq!(lines.len(), 3 + 10 + 5 + 1);
    assert!(lines[0].contains("GET READY"));
    assert!(lines.last().unwrap().contains("READY"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_cues_surface_through_session() {
    let (mut session, sink) =
        create_session(vec![SetConfig::new(10, 5, 1, 3)], TickMode::Fixed);
    let mut failures = session.subscribe_cue_failures();
    sink.set_failing(true);

    session.start().unwrap();
    advance(20_000).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(!snapshot.is_running);

    let mut failed = Vec::new();
    while let Ok(failure) = failures.try_recv() {
        assert!(!failure.message.is_empty());
        failed.push(failure.cue);
    }
    assert_eq!(failed, sink.cues());
    assert_eq!(failed.iter().filter(|c| **c == Cue::Countdown).count(), 9);
    assert_eq!(failed.last(), Some(&Cue::Completion));
}
