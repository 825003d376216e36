//! Cooperative tick loop.
//!
//! Wakes every `interval`, charges the measured clock delta to the session
//! and hands any resulting event to the caller. The loop owns no state of its
//! own: it ends as soon as it observes the session outside `Running`.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::engine::TimerState;
use super::session::TimerSession;
use crate::events::Event;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(50);
pub const MAX_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Clamp a configured tick interval into the supported range.
pub fn clamp_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL)
}

/// Drive `session` until it leaves `Running`.
///
/// `on_tick` runs after every wake with the session still locked, so it
/// can render a consistent view. Returns the state that ended the loop.
pub async fn run_ticks<F>(session: &Mutex<TimerSession>, interval: Duration, mut on_tick: F) -> TimerState
where
    F: FnMut(&TimerSession, Option<&Event>),
{
    let mut ticker = tokio::time::interval(clamp_interval(interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(interval_ms = ticker.period().as_millis() as u64, "tick loop started");

    loop {
        ticker.tick().await;
        let state = {
            let mut guard = session.lock().unwrap_or_else(|e| e.into_inner());
            if guard.state() != TimerState::Running {
                guard.state()
            } else {
                let event = guard.tick_now();
                on_tick(&guard, event.as_ref());
                guard.state()
            }
        };
        if state != TimerState::Running {
            debug!(%state, "tick loop exited");
            return state;
        }
    }
}
