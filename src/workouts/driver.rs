//! Periodic tick driver.
//!
//! A `TimerSession` wraps the engine in a single mutex and runs one tokio
//! task that ticks it at a fixed cadence while the timer runs. Every command
//! and every tick goes through the same lock, so ticks never overlap each
//! other or a plan edit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::workouts::engine::IntervalTimer;
use crate::workouts::progress::TimerSnapshot;
use crate::workouts::types::{CueFailure, SetConfig, SetUpdate, TimerError};

/// Default tick cadence.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Cue failures buffered per subscriber before it starts lagging.
const CUE_FAILURE_CAPACITY: usize = 64;

/// How the driver computes each tick's delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
    /// Every tick applies exactly one interval period
    #[default]
    Fixed,
    /// Every tick applies the measured time since the previous tick
    WallClock,
}

/// Driver cadence settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverSettings {
    pub tick_interval: Duration,
    pub mode: TickMode,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            mode: TickMode::Fixed,
        }
    }
}

struct Shared {
    timer: IntervalTimer,
    /// Bumped on every start, resume, pause and reset. A driver whose epoch
    /// no longer matches stops without ticking.
    epoch: u64,
}

/// Engine plus the task that drives it.
///
/// Commands that start the driver must be called from within a tokio
/// runtime.
pub struct TimerSession {
    shared: Arc<Mutex<Shared>>,
    settings: DriverSettings,
    driver: Option<JoinHandle<()>>,
    snapshots: Arc<watch::Sender<TimerSnapshot>>,
    cue_failures: broadcast::Sender<CueFailure>,
}

impl TimerSession {
    pub fn new(timer: IntervalTimer, settings: DriverSettings) -> Self {
        let (snapshots, _) = watch::channel(timer.snapshot());
        let (cue_failures, _) = broadcast::channel(CUE_FAILURE_CAPACITY);
        Self {
            shared: Arc::new(Mutex::new(Shared { timer, epoch: 0 })),
            settings,
            driver: None,
            snapshots: Arc::new(snapshots),
            cue_failures,
        }
    }

    /// Start the plan and the driver.
    pub fn start(&mut self) -> Result<(), TimerError> {
        let (epoch, outcome) = {
            let mut shared = lock(&self.shared);
            let outcome = shared.timer.start()?;
            shared.epoch += 1;
            (shared.epoch, outcome)
        };
        forward_failures(&self.cue_failures, outcome.cue_failures);
        self.publish();
        self.spawn_driver(epoch);
        Ok(())
    }

    /// Stop the driver and freeze the timer.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        {
            let mut shared = lock(&self.shared);
            shared.epoch += 1;
            shared.timer.pause()?;
        }
        self.stop_driver();
        self.publish();
        Ok(())
    }

    /// Continue a paused run.
    pub fn resume(&mut self) -> Result<(), TimerError> {
        let epoch = {
            let mut shared = lock(&self.shared);
            shared.timer.resume()?;
            shared.epoch += 1;
            shared.epoch
        };
        self.publish();
        self.spawn_driver(epoch);
        Ok(())
    }

    /// Stop everything and restore the default plan.
    pub fn reset(&mut self) {
        {
            let mut shared = lock(&self.shared);
            shared.epoch += 1;
            shared.timer.reset();
        }
        self.stop_driver();
        self.publish();
    }

    pub fn add_set(&self) -> Result<usize, TimerError> {
        self.edit(|timer| timer.add_set())
    }

    pub fn remove_set(&self, index: usize) -> Result<SetConfig, TimerError> {
        self.edit(|timer| timer.remove_set(index))
    }

    pub fn update_set(&self, index: usize, update: SetUpdate) -> Result<(), TimerError> {
        self.edit(|timer| timer.update_set(index, update))
    }

    pub fn select_set(&self, index: usize) -> Result<(), TimerError> {
        self.edit(|timer| timer.select_set(index))
    }

    /// Current presentation values.
    pub fn snapshot(&self) -> TimerSnapshot {
        lock(&self.shared).timer.snapshot()
    }

    /// Receive a snapshot after every tick and command.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.subscribe()
    }

    /// Receive every cue the sink rejected, from commands and driver ticks.
    pub fn subscribe_cue_failures(&self) -> broadcast::Receiver<CueFailure> {
        self.cue_failures.subscribe()
    }

    /// Read the engine under the session lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&IntervalTimer) -> R) -> R {
        f(&lock(&self.shared).timer)
    }

    /// Whether a driver task is currently alive.
    pub fn is_driving(&self) -> bool {
        self.driver.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn edit<R>(
        &self,
        f: impl FnOnce(&mut IntervalTimer) -> Result<R, TimerError>,
    ) -> Result<R, TimerError> {
        let result = f(&mut lock(&self.shared).timer);
        if result.is_ok() {
            self.publish();
        }
        result
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.snapshots.send_replace(snapshot);
    }

    fn spawn_driver(&mut self, epoch: u64) {
        self.stop_driver();
        let shared = Arc::clone(&self.shared);
        let snapshots = Arc::clone(&self.snapshots);
        let failures = self.cue_failures.clone();
        let settings = self.settings;
        self.driver = Some(tokio::spawn(run_driver(
            shared, snapshots, failures, settings, epoch,
        )));
        tracing::debug!("Driver {} started", epoch);
    }

    fn stop_driver(&mut self) {
        if let Some(handle) = self.driver.take() {
            handle.abort();
        }
    }
}

impl Drop for TimerSession {
    fn drop(&mut self) {
        self.stop_driver();
    }
}

async fn run_driver(
    shared: Arc<Mutex<Shared>>,
    snapshots: Arc<watch::Sender<TimerSnapshot>>,
    failures: broadcast::Sender<CueFailure>,
    settings: DriverSettings,
    epoch: u64,
) {
    let period = settings.tick_interval.max(Duration::from_millis(1));
    let fixed_delta = period.as_secs_f64();

    // `interval` fires immediately; the first tick belongs one period out.
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        let now = ticker.tick().await;
        let delta = match settings.mode {
            TickMode::Fixed => fixed_delta,
            TickMode::WallClock => now.duration_since(last).as_secs_f64(),
        };
        last = now;

        let (outcome, snapshot, running) = {
            let mut guard = lock(&shared);
            if guard.epoch != epoch {
                return;
            }
            let outcome = guard.timer.tick(delta);
            (outcome, guard.timer.snapshot(), guard.timer.is_running())
        };

        forward_failures(&failures, outcome.cue_failures);
        snapshots.send_replace(snapshot);

        if !running {
            tracing::debug!("Driver {} finished", epoch);
            return;
        }
    }
}

fn forward_failures(tx: &broadcast::Sender<CueFailure>, failures: Vec<CueFailure>) {
    for failure in failures {
        // No subscribers is fine; the engine already logged the failure.
        let _ = tx.send(failure);
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
