//! Recognizable target objects and their color signatures

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;

/// Inclusive HSV range on the 0–180 / 0–255 / 0–255 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    /// Lower bound `[h, s, v]`
    pub low: [u8; 3],
    /// Upper bound `[h, s, v]`
    pub high: [u8; 3],
}

impl HsvRange {
    /// Check whether an HSV triple falls inside the range
    #[must_use]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| self.low[i] <= hsv[i] && hsv[i] <= self.high[i])
    }
}

/// Closed set of objects the tracker can search for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetId {
    Orange,
    Lemon,
    Tomato,
    GreenApple,
}

impl TargetId {
    /// Every target, in sub-classifier order
    pub const ALL: [Self; 4] = [Self::Orange, Self::Lemon, Self::GreenApple, Self::Tomato];

    /// Stable identifier (`green_apple`, ...)
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Orange => "orange",
            Self::Lemon => "lemon",
            Self::Tomato => "tomato",
            Self::GreenApple => "green_apple",
        }
    }

    /// Human-readable title used for labels and responses
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Orange => "Orange",
            Self::Lemon => "Lemon",
            Self::Tomato => "Tomato",
            Self::GreenApple => "Green apple",
        }
    }

    /// Color signature used by the detector
    ///
    /// Lower the minimum value channel to make a range more sensitive.
    #[must_use]
    pub const fn color_range(self) -> HsvRange {
        match self {
            Self::Orange => HsvRange {
                low: [5, 150, 150],
                high: [15, 255, 255],
            },
            Self::GreenApple => HsvRange {
                low: [40, 100, 80],
                high: [80, 255, 255],
            },
            Self::Tomato => HsvRange {
                low: [0, 180, 120],
                high: [10, 255, 255],
            },
            Self::Lemon => HsvRange {
                low: [20, 0, 0],
                high: [40, 255, 255],
            },
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TargetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.id() == normalized)
            .ok_or_else(|| Error::Config(format!("unknown target: {s}")))
    }
}
