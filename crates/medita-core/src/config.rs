//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default countdown length and tick cadence
//! - Whether no-op commands are errors (strict transitions)
//! - Completion alert settings
//! - Default theme
//!
//! Configuration is read from `~/.config/medita/config.toml`. The file is
//! never written; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::sound::{NotificationSound, SilentSound, TerminalBell};
use crate::theme::ThemeId;
use crate::timer::{driver, Preset, TimerEngine, TransitionPolicy};

/// Returns `~/.config/medita[-dev]/` based on MEDITA_ENV.
///
/// Set MEDITA_ENV=dev to use the development config directory.
pub fn data_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MEDITA_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("medita-dev")
    } else {
        base_dir.join("medita")
    }
}

/// Timer-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Selected when the timer screen opens. Need not be a preset.
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub strict_transitions: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ring the terminal bell on completion.
    #[serde(default = "default_true")]
    pub bell: bool,
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: ThemeId,
}

/// Application configuration.
///
/// Deserialized from TOML at `~/.config/medita/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

// Default functions
fn default_minutes() -> u32 {
    Preset::default().minutes()
}
fn default_tick_interval_ms() -> u64 {
    driver::DEFAULT_TICK_INTERVAL.as_millis() as u64
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
            strict_transitions: false,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn path() -> PathBuf {
        data_dir().join("config.toml")
    }

    /// Load from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read, parsed
    /// or validated.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    /// Load from `path`, or return defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Parse and validate TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.default_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.default_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Tick cadence, clamped to what the driver supports.
    pub fn tick_interval(&self) -> Duration {
        driver::clamp_interval(Duration::from_millis(self.timer.tick_interval_ms))
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        if self.timer.strict_transitions {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Lenient
        }
    }

    /// A fresh idle engine with the configured default duration.
    pub fn engine(&self) -> TimerEngine {
        match Preset::from_minutes(self.timer.default_minutes) {
            Ok(preset) => TimerEngine::from_preset(preset),
            Err(_) => TimerEngine::from_custom(self.timer.default_minutes, 0)
                .unwrap_or_default(),
        }
    }

    /// Whether completion should ring the terminal bell.
    pub fn wants_bell(&self) -> bool {
        self.notifications.enabled && self.notifications.bell
    }

    /// The completion alert player these settings ask for, ringing on `out`.
    pub fn sound<W>(&self, out: W) -> Box<dyn NotificationSound>
    where
        W: std::io::Write + Send + 'static,
    {
        if self.wants_bell() {
            Box::new(TerminalBell::new(out))
        } else {
            Box::new(SilentSound)
        }
    }
}
