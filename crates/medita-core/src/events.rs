use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{DurationSource, TimerState};

/// Every state change in the timer produces an Event.
/// The presentation layer renders them; the session routes completion to sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DurationSelected {
        total_ms: u64,
        source: DurationSource,
        at: DateTime<Utc>,
    },
    TimerStarted {
        total_ms: u64,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// One-shot: fired exactly once when remaining time reaches zero.
    TimerCompleted {
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        total_ms: u64,
        at: DateTime<Utc>,
    },
    /// Time spent backgrounded was subtracted from the countdown.
    SuspensionReconciled {
        elapsed_ms: u64,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        remaining_ms: u64,
        total_ms: u64,
        /// 0.0 .. 1.0
        progress: f64,
        /// `MM:SS`
        display: String,
        label: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::TimerCompleted { .. })
    }
}
