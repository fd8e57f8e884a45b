//! Interval workout module: plan, phase engine, derived values and driver.

pub mod driver;
pub mod engine;
pub mod plan;
pub mod progress;
pub mod types;

pub use driver::{DriverSettings, TickMode, TimerSession};
pub use engine::{EngineSettings, IntervalTimer};
pub use plan::PlanStore;
pub use progress::TimerSnapshot;
pub use types::{
    CountdownCueMode, Cue, CueFailure, Phase, SetConfig, SetLimits, SetUpdate, TickOutcome,
    TimerError, TimerState, Transition,
};
