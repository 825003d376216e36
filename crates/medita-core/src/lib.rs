//! # Medita Core Library
//!
//! This library provides the countdown timer behind the Medita meditation
//! app. Presentation layers (the bundled CLI, or any GUI) render its state
//! and forward user taps and lifecycle callbacks to it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-delta state machine that requires the caller
//!   to periodically invoke `tick()` and to report suspension/resume
//! - **Session**: Owns one engine, one clock and one completion sound
//! - **Driver**: Async tick loop that runs only while the timer is running
//! - **Config**: Read-only TOML preferences
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerSession`]: Command routing and completion sound ownership
//! - [`NotificationSound`]: Trait for completion alert players
//! - [`Config`]: Application configuration

pub mod config;
pub mod error;
pub mod events;
pub mod sound;
pub mod theme;
pub mod timer;

pub use config::Config;
pub use error::{ConfigError, SoundError, TimerError};
pub use events::Event;
pub use sound::NotificationSound;
pub use theme::{Theme, ThemeId};
pub use timer::{Command, Preset, TimerEngine, TimerSession, TimerState, TransitionPolicy};
