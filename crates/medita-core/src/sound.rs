//! Completion alert players.
//!
//! The session owns exactly one player and is the only thing that calls it.
//! Failures are reported back as [`SoundError`] and never touch timer state.

use std::io::Write;

use crate::error::SoundError;

pub trait NotificationSound: Send {
    /// Play the alert, restarting it if it is already playing.
    fn play(&mut self) -> Result<(), SoundError>;

    /// Silence the alert. Must be a no-op when nothing is playing.
    fn stop(&mut self) -> Result<(), SoundError>;
}

/// Rings the terminal bell (ASCII BEL) on the wrapped writer.
pub struct TerminalBell<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> NotificationSound for TerminalBell<W> {
    fn play(&mut self) -> Result<(), SoundError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        // A bell cannot be cut short.
        Ok(())
    }
}

/// Used when notifications are disabled.
#[derive(Debug, Default)]
pub struct SilentSound;

impl NotificationSound for SilentSound {
    fn play(&mut self) -> Result<(), SoundError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        Ok(())
    }
}

/// Counts calls; optionally fails every play. Useful for hosts' tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSound {
    inner: std::sync::Arc<std::sync::Mutex<RecordedCalls>>,
    fail_play: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordedCalls {
    pub plays: usize,
    pub stops: usize,
    /// Whether the alert is currently sounding.
    pub playing: bool,
}

impl RecordingSound {
    pub fn new() -> Self {
        Self::default()
    }

    /// A player whose device is always unavailable.
    pub fn failing() -> Self {
        Self {
            fail_play: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> RecordedCalls {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NotificationSound for RecordingSound {
    fn play(&mut self) -> Result<(), SoundError> {
        let mut calls = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        calls.plays += 1;
        if self.fail_play {
            return Err(SoundError::Unavailable("no audio device".into()));
        }
        calls.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        let mut calls = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        calls.stops += 1;
        calls.playing = false;
        Ok(())
    }
}
