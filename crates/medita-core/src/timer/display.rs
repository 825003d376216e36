//! Text shown on the countdown face.

use super::engine::TimerState;

/// `MM:SS` of the remaining time, whole seconds rounded down.
///
/// Minutes are not wrapped at 60, so a 90-minute custom timer shows `90:00`.
pub fn format_remaining(remaining_ms: u64) -> String {
    let total_secs = remaining_ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

pub fn state_label(state: TimerState) -> &'static str {
    match state {
        TimerState::Idle => "Ready",
        TimerState::Running => "Counting down",
        TimerState::Paused => "Paused",
        TimerState::Completed => "Complete",
    }
}

/// Label for the single start/pause button.
pub fn primary_action_label(state: TimerState) -> &'static str {
    if state == TimerState::Running {
        "Pause"
    } else {
        "Start"
    }
}
