//! RustInterval - Interval Workout Timer
//!
//! Drives a configurable sequence of timed intervals (countdown, work, rest)
//! across rounds and sets, and emits audio cues at phase boundaries and in
//! the last seconds of each phase.

pub mod audio;
pub mod storage;
pub mod ui;
pub mod workouts;

// Re-export commonly used types
pub use audio::{CueSink, ToneCueSink};
pub use storage::config::AppConfig;
pub use workouts::driver::TimerSession;
pub use workouts::engine::IntervalTimer;
pub use workouts::plan::PlanStore;
