//! Signal classification types reported by a scan.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the exhaustion pattern fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Upward run exhausted — a potential top.
    Top,
    /// Downward run exhausted — a potential bottom.
    Bottom,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Top => write!(f, "Top"),
            Direction::Bottom => write!(f, "Bottom"),
        }
    }
}

/// Which threshold the reset-relative count hit on the final bar.
///
/// Both thresholds are computed independently; when both fire on the same
/// side of the same evaluation, `Thirteen` subsumes `Nine` in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStrength {
    Nine,
    Thirteen,
}

impl SetupStrength {
    pub fn count(&self) -> u32 {
        match self {
            SetupStrength::Nine => 9,
            SetupStrength::Thirteen => 13,
        }
    }
}

impl fmt::Display for SetupStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// One detected occurrence: a ticker that hit a threshold on the final bar.
///
/// At most one per (ticker, resolution, direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSignal {
    pub ticker: String,
    pub last_close: f64,
    pub strength: SetupStrength,
    pub industry: String,
}

impl TickerSignal {
    /// Display label, e.g. `Setup 13 Top`.
    pub fn label(&self, direction: Direction) -> String {
        format!("Setup {} {}", self.strength, direction)
    }
}
