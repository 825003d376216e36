//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads or read the clock itself - the caller passes the elapsed
//! time to `tick()` and the lifecycle instants to `on_suspend()`/`on_resume()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> Completed -> Running ...
//!   ^________________ reset() from anywhere _________________|
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::from_preset(Preset::Five);
//! engine.start();
//! // In a loop:
//! engine.tick(elapsed_ms); // Returns Some(Event::TimerCompleted) exactly once
//! ```

use std::fmt;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::display;
use super::duration::{custom_duration_ms, DurationSource, Preset};
use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Core countdown engine.
///
/// Invariant: `remaining_ms` is always within `0..=total_ms`.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    state: TimerState,
    total_ms: u64,
    remaining_ms: u64,
    source: DurationSource,
    /// Set by `on_suspend` while running; consumed by `on_resume`.
    suspended_at: Option<Instant>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl TimerEngine {
    /// Create an idle engine with a preset duration selected.
    pub fn from_preset(preset: Preset) -> Self {
        Self::idle_with(preset.duration_ms(), DurationSource::Preset)
    }

    /// Create an idle engine with a custom duration selected.
    pub fn from_custom(minutes: u32, seconds: u32) -> Result<Self, TimerError> {
        let total = custom_duration_ms(minutes, seconds)?;
        Ok(Self::idle_with(total, DurationSource::Custom))
    }

    fn idle_with(total_ms: u64, source: DurationSource) -> Self {
        Self {
            state: TimerState::Idle,
            total_ms,
            remaining_ms: total_ms,
            source,
            suspended_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn source(&self) -> DurationSource {
        self.source
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    /// 0.0 .. 1.0 progress through the selected duration.
    pub fn progress(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / self.total_ms as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining_ms: self.remaining_ms,
            total_ms: self.total_ms,
            progress: self.progress(),
            display: display::format_remaining(self.remaining_ms),
            label: display::state_label(self.state).to_string(),
            at: Utc::now(),
        }
    }

    // ── Duration selection ───────────────────────────────────────────

    /// Select a quick-select preset. Ignored while running.
    pub fn select_preset(&mut self, preset: Preset) -> Option<Event> {
        self.select(preset.duration_ms(), DurationSource::Preset)
    }

    /// Select a custom minutes+seconds duration.
    ///
    /// Invalid entries are rejected before anything else is looked at, so the
    /// previous selection is left untouched. Ignored while running.
    pub fn select_custom(&mut self, minutes: u32, seconds: u32) -> Result<Option<Event>, TimerError> {
        let total = custom_duration_ms(minutes, seconds)?;
        Ok(self.select(total, DurationSource::Custom))
    }

    fn select(&mut self, total_ms: u64, source: DurationSource) -> Option<Event> {
        if self.state == TimerState::Running {
            debug!(total_ms, "duration change ignored while running");
            return None;
        }
        self.total_ms = total_ms;
        self.remaining_ms = total_ms;
        self.source = source;
        self.state = TimerState::Idle;
        self.suspended_at = None;
        debug!(total_ms, ?source, "duration selected");
        Some(Event::DurationSelected {
            total_ms,
            source,
            at: Utc::now(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh countdown from Idle/Completed, or resume from Paused.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Completed => {
                self.remaining_ms = self.total_ms;
                self.state = TimerState::Running;
                debug!(total_ms = self.total_ms, "timer started");
                Some(Event::TimerStarted {
                    total_ms: self.total_ms,
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            TimerState::Paused => {
                self.state = TimerState::Running;
                debug!(remaining_ms = self.remaining_ms, "timer resumed");
                Some(Event::TimerResumed {
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            TimerState::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                // Time spent paused is not owed to the countdown.
                self.suspended_at = None;
                debug!(remaining_ms = self.remaining_ms, "timer paused");
                Some(Event::TimerPaused {
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Back to Idle with the full duration. Valid from every state.
    pub fn reset(&mut self) -> Event {
        self.state = TimerState::Idle;
        self.remaining_ms = self.total_ms;
        self.suspended_at = None;
        debug!(total_ms = self.total_ms, "timer reset");
        Event::TimerReset {
            total_ms: self.total_ms,
            at: Utc::now(),
        }
    }

    /// Call periodically with the wall-clock time since the previous tick.
    /// Returns `Some(Event::TimerCompleted)` when the countdown hits zero.
    pub fn tick(&mut self, elapsed_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.consume(elapsed_ms)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Host is no longer visible. Only recorded while running.
    pub fn on_suspend(&mut self, now: Instant) {
        if self.state == TimerState::Running {
            debug!("suspension recorded");
            self.suspended_at = Some(now);
        }
    }

    /// Host is visible again; charge the suspension gap to the countdown.
    ///
    /// Returns `TimerCompleted` if the gap used up the remaining time,
    /// `SuspensionReconciled` otherwise, or `None` when there was nothing
    /// to reconcile.
    pub fn on_resume(&mut self, now: Instant) -> Option<Event> {
        let since = self.suspended_at.take()?;
        if self.state != TimerState::Running {
            debug!(state = %self.state, "stale suspension discarded");
            return None;
        }
        let elapsed_ms = duration_ms(now.saturating_duration_since(since));
        debug!(elapsed_ms, "reconciling suspension gap");
        if let Some(done) = self.consume(elapsed_ms) {
            return Some(done);
        }
        Some(Event::SuspensionReconciled {
            elapsed_ms,
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn consume(&mut self, elapsed_ms: u64) -> Option<Event> {
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms == 0 {
            self.state = TimerState::Completed;
            self.suspended_at = None;
            debug!(total_ms = self.total_ms, "timer completed");
            return Some(Event::TimerCompleted {
                total_ms: self.total_ms,
                at: Utc::now(),
            });
        }
        None
    }
}

fn duration_ms(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
