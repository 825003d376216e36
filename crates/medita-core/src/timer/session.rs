//! A timer screen's worth of state: one engine, one clock, one sound player.
//!
//! The session turns user commands and host lifecycle callbacks into engine
//! calls, measures tick deltas from its clock, and is the only caller of the
//! notification sound. Dropping the session releases the player.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::duration::Preset;
use super::engine::{TimerEngine, TimerState};
use crate::error::TimerError;
use crate::events::Event;
use crate::sound::NotificationSound;

/// How commands that would do nothing are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// No-ops return `Ok(None)`.
    #[default]
    Lenient,
    /// No-ops return `TimerError::IllegalTransition`.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectPreset(Preset),
    SelectCustom { minutes: u32, seconds: u32 },
    Start,
    Pause,
    /// Pause when running, start otherwise.
    Toggle,
    Reset,
}

impl Command {
    fn verb(self) -> &'static str {
        match self {
            Command::SelectPreset(_) | Command::SelectCustom { .. } => "select a duration",
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Toggle => "toggle",
            Command::Reset => "reset",
        }
    }
}

pub struct TimerSession {
    engine: TimerEngine,
    clock: Box<dyn Clock>,
    sound: Box<dyn NotificationSound>,
    policy: TransitionPolicy,
    /// Clock reading already charged to the countdown. Only set while running.
    last_tick: Option<Instant>,
}

impl TimerSession {
    pub fn new(
        engine: TimerEngine,
        clock: Box<dyn Clock>,
        sound: Box<dyn NotificationSound>,
    ) -> Self {
        Self {
            engine,
            clock,
            sound,
            policy: TransitionPolicy::default(),
            last_tick: None,
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    /// Apply a user command.
    ///
    /// # Errors
    ///
    /// `InvalidDuration` for a bad custom entry; `IllegalTransition` for a
    /// no-op command under [`TransitionPolicy::Strict`].
    pub fn apply(&mut self, command: Command) -> Result<Option<Event>, TimerError> {
        let state = self.engine.state();
        let event = match command {
            Command::SelectPreset(preset) => self.engine.select_preset(preset),
            Command::SelectCustom { minutes, seconds } => {
                self.engine.select_custom(minutes, seconds)?
            }
            Command::Start => self.engine.start(),
            Command::Pause => self.engine.pause(),
            Command::Toggle if state == TimerState::Running => self.engine.pause(),
            Command::Toggle => self.engine.start(),
            Command::Reset => {
                self.silence();
                Some(self.engine.reset())
            }
        };

        if event.is_none() && self.policy == TransitionPolicy::Strict {
            return Err(TimerError::IllegalTransition {
                command: command.verb(),
                state,
            });
        }

        self.sync_tick_mark();
        Ok(event.map(|e| self.route(e)))
    }

    /// Charge the time since the previous tick to the countdown.
    ///
    /// Only whole milliseconds are consumed; the remainder carries over to
    /// the next tick so rounding never accumulates.
    pub fn tick_now(&mut self) -> Option<Event> {
        if self.engine.state() != TimerState::Running {
            self.last_tick = None;
            return None;
        }
        // The gap is charged by resume().
        if self.engine.is_suspended() {
            return None;
        }
        let now = self.clock.now();
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return None;
        };
        let elapsed = now.saturating_duration_since(last);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.last_tick = Some(last + Duration::from_millis(elapsed_ms));

        let event = self.engine.tick(elapsed_ms);
        self.sync_tick_mark();
        event.map(|e| self.route(e))
    }

    /// Host went to the background.
    ///
    /// The countdown is brought up to date first so only the gap itself is
    /// reconciled on resume; that catch-up tick may complete the timer.
    pub fn suspend(&mut self) -> Option<Event> {
        let caught_up = self.tick_now();
        self.engine.on_suspend(self.clock.now());
        caught_up
    }

    /// Host is in the foreground again.
    pub fn resume(&mut self) -> Option<Event> {
        if !self.engine.is_suspended() {
            return None;
        }
        let now = self.clock.now();
        let event = self.engine.on_resume(now);
        if self.engine.state() == TimerState::Running {
            // The gap was charged by on_resume; don't count it again.
            self.last_tick = Some(now);
        }
        self.sync_tick_mark();
        event.map(|e| self.route(e))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn sync_tick_mark(&mut self) {
        match (self.engine.state(), self.last_tick) {
            (TimerState::Running, None) => self.last_tick = Some(self.clock.now()),
            (TimerState::Running, Some(_)) => {}
            (_, _) => self.last_tick = None,
        }
    }

    fn route(&mut self, event: Event) -> Event {
        if event.is_completion() {
            info!(total_ms = self.engine.total_ms(), "meditation complete");
            if let Err(e) = self.sound.play() {
                warn!(error = %e, "completion sound failed");
            }
        }
        event
    }

    fn silence(&mut self) {
        debug!("silencing completion sound");
        if let Err(e) = self.sound.stop() {
            warn!(error = %e, "failed to stop completion sound");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::RecordingSound;
    use crate::timer::clock::ManualClock;

    fn session(preset: Preset) -> (TimerSession, ManualClock, RecordingSound) {
        let clock = ManualClock::new();
        let sound = RecordingSound::new();
        let session = TimerSession::new(
            TimerEngine::from_preset(preset),
            Box::new(clock.clone()),
            Box::new(sound.clone()),
        );
        (session, clock, sound)
    }

    #[test]
    fn ticks_follow_clock_deltas() {
        let (mut s, clock, _) = session(Preset::One);
        s.apply(Command::Start).unwrap();
        clock.advance_ms(1_250);
        s.tick_now();
        clock.advance_ms(750);
        s.tick_now();
        assert_eq!(s.engine().remaining_ms(), 58_000);
    }

    #[test]
    fn sub_millisecond_remainders_carry_over() {
        let (mut s, clock, _) = session(Preset::One);
        s.apply(Command::Start).unwrap();
        for _ in 0..4 {
            clock.advance(Duration::from_micros(1_250));
            s.tick_now();
        }
        assert_eq!(s.engine().remaining_ms(), 59_995);
    }

    #[test]
    fn paused_time_is_not_charged() {
        let (mut s, clock, _) = session(Preset::One);
        s.apply(Command::Start).unwrap();
        clock.advance_ms(10_000);
        s.tick_now();
        s.apply(Command::Pause).unwrap();
        clock.advance_ms(30_000);
        s.tick_now();
        s.apply(Command::Start).unwrap();
        clock.advance_ms(1_000);
        s.tick_now();
        assert_eq!(s.engine().remaining_ms(), 49_000);
    }

    #[test]
    fn completion_plays_sound_once_and_reset_stops_it() {
        let (mut s, clock, sound) = session(Preset::One);
        s.apply(Command::Start).unwrap();
        clock.advance_ms(61_000);
        assert!(s.tick_now().unwrap().is_completion());
        clock.advance_ms(1_000);
        assert!(s.tick_now().is_none());
        assert_eq!(sound.calls().plays, 1);
        assert!(sound.calls().playing);

        s.apply(Command::Reset).unwrap();
        assert!(!sound.calls().playing);
        assert_eq!(s.state(), TimerState::Idle);
    }

    #[test]
    fn sound_failure_does_not_affect_state() {
        let clock = ManualClock::new();
        let sound = RecordingSound::failing();
        let mut s = TimerSession::new(
            TimerEngine::from_preset(Preset::One),
            Box::new(clock.clone()),
            Box::new(sound.clone()),
        );
        s.apply(Command::Start).unwrap();
        clock.advance_ms(60_000);
        assert!(s.tick_now().unwrap().is_completion());
        assert_eq!(s.state(), TimerState::Completed);
        assert_eq!(sound.calls().plays, 1);
    }

    #[test]
    fn suspension_gap_is_charged_once() {
        let (mut s, clock, sound) = session(Preset::One);
        s.apply(Command::Start).unwrap();
        clock.advance_ms(10_000);
        s.tick_now();
        s.suspend();
        clock.advance_ms(20_000);
        assert!(matches!(
            s.resume(),
            Some(Event::SuspensionReconciled { remaining_ms: 30_000, .. })
        ));
        clock.advance_ms(500);
        s.tick_now();
        assert_eq!(s.engine().remaining_ms(), 29_500);
        assert_eq!(sound.calls().plays, 0);
    }

    #[test]
    fn ticks_while_suspended_are_not_charged() {
        let (mut s, clock, _) = session(Preset::One);
        s.apply(Command::Start).unwrap();
        clock.advance_ms(10_000);
        s.tick_now();
        s.suspend();
        for _ in 0..100 {
            clock.advance_ms(200);
            assert!(s.tick_now().is_none());
        }
        assert_eq!(s.engine().remaining_ms(), 50_000);
        assert!(matches!(
            s.resume(),
            Some(Event::SuspensionReconciled {
                elapsed_ms: 20_000,
                remaining_ms: 30_000,
                ..
            })
        ));
        clock.advance_ms(1_000);
        s.tick_now();
        assert_eq!(s.engine().remaining_ms(), 29_000);
    }

    #[test]
    fn suspension_past_end_completes_with_sound() {
        let (mut s, clock, sound) = session(Preset::One);
        s.apply(Command::Start).unwrap();
        clock.advance_ms(10_000);
        s.tick_now();
        s.suspend();
        clock.advance_ms(55_000);
        assert!(s.resume().unwrap().is_completion());
        assert_eq!(s.state(), TimerState::Completed);
        assert_eq!(sound.calls().plays, 1);
        assert!(s.resume().is_none());
    }

    #[test]
    fn toggle_alternates() {
        let (mut s, _, _) = session(Preset::Three);
        s.apply(Command::Toggle).unwrap();
        assert_eq!(s.state(), TimerState::Running);
        s.apply(Command::Toggle).unwrap();
        assert_eq!(s.state(), TimerState::Paused);
        s.apply(Command::Toggle).unwrap();
        assert_eq!(s.state(), TimerState::Running);
    }

    #[test]
    fn lenient_policy_swallows_noops() {
        let (mut s, _, _) = session(Preset::Five);
        assert_eq!(s.apply(Command::Pause), Ok(None));
        s.apply(Command::Start).unwrap();
        assert_eq!(s.apply(Command::SelectPreset(Preset::Ten)), Ok(None));
        assert_eq!(s.engine().total_ms(), 300_000);
    }

    #[test]
    fn strict_policy_reports_illegal_transitions() {
        let (s, _, _) = session(Preset::Five);
        let mut s = s.with_policy(TransitionPolicy::Strict);
        assert_eq!(
            s.apply(Command::Pause),
            Err(TimerError::IllegalTransition {
                command: "pause",
                state: TimerState::Idle
            })
        );
        s.apply(Command::Start).unwrap();
        assert!(s.apply(Command::Start).is_err());
        assert!(s.apply(Command::SelectPreset(Preset::One)).is_err());
        assert!(s.apply(Command::Reset).unwrap().is_some());
        assert!(s.apply(Command::Reset).is_ok());
    }

    #[test]
    fn invalid_custom_is_reported_in_both_policies() {
        let (mut s, _, _) = session(Preset::Five);
        assert_eq!(
            s.apply(Command::SelectCustom { minutes: 0, seconds: 0 }),
            Err(TimerError::InvalidDuration { minutes: 0, seconds: 0 })
        );
        assert_eq!(s.engine().total_ms(), 300_000);
    }
}
