//! UI module: renderer contract and the terminal front end.

pub mod format;
pub mod terminal;

use crate::workouts::progress::TimerSnapshot;

pub use format::{format_clock, format_duration, phase_label};
pub use terminal::TerminalRenderer;

/// Pull-based renderer: reads a snapshot after each tick or plan edit.
pub trait Renderer {
    fn render(&mut self, snapshot: &TimerSnapshot) -> std::io::Result<()>;
}
