use serde::{Deserialize, Serialize};

use crate::error::TimerError;

const MS_PER_MIN: u64 = 60_000;
const MS_PER_SEC: u64 = 1_000;

/// Quick-select durations offered on the timer screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Preset {
    One,
    Three,
    Five,
    Ten,
    Fifteen,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::One,
        Preset::Three,
        Preset::Five,
        Preset::Ten,
        Preset::Fifteen,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            Preset::One => 1,
            Preset::Three => 3,
            Preset::Five => 5,
            Preset::Ten => 10,
            Preset::Fifteen => 15,
        }
    }

    pub fn duration_ms(self) -> u64 {
        u64::from(self.minutes()) * MS_PER_MIN
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, TimerError> {
        Self::ALL
            .into_iter()
            .find(|p| p.minutes() == minutes)
            .ok_or(TimerError::UnknownPreset(minutes))
    }
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Five
    }
}

impl TryFrom<u32> for Preset {
    type Error = TimerError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes)
    }
}

impl From<Preset> for u32 {
    fn from(p: Preset) -> Self {
        p.minutes()
    }
}

/// Where the current total duration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationSource {
    Preset,
    Custom,
}

/// Validate a custom minutes+seconds entry and return its length in ms.
///
/// Seconds must be in `0..=59` and the total must be positive.
pub fn custom_duration_ms(minutes: u32, seconds: u32) -> Result<u64, TimerError> {
    if seconds > 59 {
        return Err(TimerError::InvalidDuration { minutes, seconds });
    }
    let total = u64::from(minutes)
        .saturating_mul(MS_PER_MIN)
        .saturating_add(u64::from(seconds) * MS_PER_SEC);
    if total == 0 {
        return Err(TimerError::InvalidDuration { minutes, seconds });
    }
    Ok(total)
}
