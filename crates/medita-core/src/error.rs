//! Core error types for medita-core.
//!
//! Timer, sound and configuration failures each get their own enum.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::TimerState;

/// Errors raised by timer commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Custom duration is zero or has seconds outside 0..=59.
    #[error("Invalid duration: {minutes}m {seconds}s (total must be positive, seconds 0-59)")]
    InvalidDuration { minutes: u32, seconds: u32 },

    /// Command is a no-op in the current state (strict mode only).
    #[error("Illegal transition: cannot {command} while {state}")]
    IllegalTransition {
        command: &'static str,
        state: TimerState,
    },

    /// Minute value is not one of the quick-select presets.
    #[error("Unknown preset: {0} minutes (expected one of 1, 3, 5, 10, 15)")]
    UnknownPreset(u32),
}

/// Notification sound errors.
#[derive(Error, Debug)]
pub enum SoundError {
    #[error("Sound output failed: {0}")]
    Io(#[from] std::io::Error),

    /// Audio device unavailable
    #[error("Sound device unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}
