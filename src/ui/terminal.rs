//! Line-oriented terminal renderer.

use std::io::Write;

use super::format::{format_clock, format_duration, phase_label, progress_bar};
use super::Renderer;
use crate::workouts::progress::TimerSnapshot;
use crate::workouts::types::Phase;

const BAR_WIDTH: usize = 20;

/// What a printed line depends on; a new line is written only when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameKey {
    phase: Phase,
    display_seconds: u64,
    round: u32,
    set_index: usize,
    total_sets: usize,
    running: bool,
}

impl From<&TimerSnapshot> for FrameKey {
    fn from(snapshot: &TimerSnapshot) -> Self {
        Self {
            phase: snapshot.phase,
            display_seconds: snapshot.display_seconds,
            round: snapshot.current_round,
            set_index: snapshot.current_set_index,
            total_sets: snapshot.total_sets,
            running: snapshot.is_running,
        }
    }
}

/// Prints one status line per displayed second, as text or JSON.
pub struct TerminalRenderer<W: Write> {
    out: W,
    json: bool,
    last: Option<FrameKey>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            last: None,
        }
    }

    /// Forget the previous frame so the next render always prints.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, snapshot: &TimerSnapshot) -> std::io::Result<()> {
        let key = FrameKey::from(snapshot);
        if self.last == Some(key) {
            return Ok(());
        }
        self.last = Some(key);

        if self.json {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            writeln!(self.out, "{}", line)?;
        } else {
            writeln!(self.out, "{}", status_line(snapshot))?;
        }
        self.out.flush()
    }
}

/// One-line human readable status.
pub fn status_line(snapshot: &TimerSnapshot) -> String {
    let mut line = format!(
        "Set {}/{} ",
        snapshot.current_set_index + 1,
        snapshot.total_sets
    );

    if snapshot.phase == Phase::Idle {
        line.push_str(&format!(
            "{:<9} {:>5}  plan {}",
            phase_label(snapshot.phase),
            format_duration(snapshot.display_seconds),
            format_duration(snapshot.total_planned_time as u64)
        ));
    } else {
        line.push_str(&format!(
            "Round {}/{} {:<9} {:>5} [{}] {:>3}% | remaining {}",
            snapshot.current_round,
            snapshot.total_rounds,
            phase_label(snapshot.phase),
            format_duration(snapshot.display_seconds),
            progress_bar(snapshot.progress, BAR_WIDTH),
            (snapshot.overall_progress * 100.0).round() as u32,
            format_clock(snapshot.remaining_planned_time)
        ));
        if !snapshot.is_running {
            line.push_str("  (paused)");
        }
    }

    if !snapshot.details.is_empty() {
        line.push_str(" | ");
        line.push_str(&snapshot.details);
    }
    line
}
