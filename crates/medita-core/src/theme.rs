//! Built-in visual themes.
//!
//! Plain palette data; how it is painted is up to the presentation layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeId {
    #[default]
    Ocean,
    Forest,
    StarrySky,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: ThemeId,
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Top-to-bottom background gradient, `#RRGGBB`.
    pub gradient: [&'static str; 2],
    /// Accent for text and buttons, `#RRGGBB`.
    pub accent: &'static str,
}

static CATALOG: [Theme; 3] = [
    Theme {
        id: ThemeId::Ocean,
        title: "Ocean",
        subtitle: "Calm swells",
        gradient: ["#E0F7FA", "#B2EBF2"],
        accent: "#00838F",
    },
    Theme {
        id: ThemeId::Forest,
        title: "Forest",
        subtitle: "Gentle breeze",
        gradient: ["#E8F5E9", "#C8E6C9"],
        accent: "#2E7D32",
    },
    Theme {
        id: ThemeId::StarrySky,
        title: "Starry Sky",
        subtitle: "Midnight hush",
        gradient: ["#EDE7F6", "#D1C4E9"],
        accent: "#512DA8",
    },
];

/// All themes in display order.
pub fn catalog() -> &'static [Theme] {
    &CATALOG
}

impl ThemeId {
    pub fn theme(self) -> &'static Theme {
        // CATALOG is declared in enum order.
        &CATALOG[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Ocean => "ocean",
            ThemeId::Forest => "forest",
            ThemeId::StarrySky => "starry_sky",
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "ocean" => Ok(ThemeId::Ocean),
            "forest" => Ok(ThemeId::Forest),
            "starry_sky" | "starry" => Ok(ThemeId::StarrySky),
            other => Err(ConfigError::InvalidValue {
                key: "ui.theme".into(),
                message: format!("unknown theme '{other}'"),
            }),
        }
    }
}
