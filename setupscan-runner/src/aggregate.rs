//! Sector aggregation — per-sector signal counts and the curated grid.
//!
//! Both views are built fresh for each scan and owned by the result; no
//! state is shared across scans.

use serde::{Deserialize, Serialize};
use setupscan_core::data::TickerDirectory;
use setupscan_core::domain::{Direction, SetupStrength, TickerSignal};
use std::collections::BTreeMap;

/// One increment per (ticker, direction). No weighting.
pub fn count_by_sector(
    signals: &[TickerSignal],
    directory: &TickerDirectory,
) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for signal in signals {
        let sector = directory.sector_of(&signal.ticker).to_string();
        *counts.entry(sector).or_insert(0) += 1;
    }
    counts
}

/// The curated sector/industry labels, in display layout order.
pub const GRID_LABELS: [[&str; 6]; 3] = [
    [
        "Technology",
        "Financials",
        "Communications",
        "Cons. Discretionary",
        "Energy",
        "Real Estate",
    ],
    [
        "Healthcare",
        "Regional Banks",
        "Industrials",
        "Cons. Staples",
        "Utilities",
        "Home Builders",
    ],
    [
        "Materials",
        "Gold",
        "Silver",
        "Bitcoin",
        "Ethereum",
        "Memes",
    ],
];

/// The strongest signal observed for one grid label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSignal {
    pub direction: Direction,
    pub strength: SetupStrength,
}

/// Sector grid: each curated label mapped to the single strongest signal
/// observed for it; labels with no signal render as neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorGrid {
    cells: BTreeMap<String, GridSignal>,
}

impl SectorGrid {
    /// Build the grid from a scan's signal lists, keyed by industry label.
    ///
    /// A 13-class signal replaces a 9-class one for the same label; the
    /// first signal observed wins otherwise.
    pub fn build(tops: &[TickerSignal], bottoms: &[TickerSignal]) -> Self {
        let mut grid = Self::default();
        for (direction, signals) in [(Direction::Top, tops), (Direction::Bottom, bottoms)] {
            for signal in signals {
                grid.observe(&signal.industry, direction, signal.strength);
            }
        }
        grid
    }

    fn observe(&mut self, label: &str, direction: Direction, strength: SetupStrength) {
        let incoming = GridSignal {
            direction,
            strength,
        };
        match self.cells.get(label) {
            None => {
                self.cells.insert(label.to_string(), incoming);
            }
            Some(current)
                if strength == SetupStrength::Thirteen
                    && current.strength == SetupStrength::Nine =>
            {
                self.cells.insert(label.to_string(), incoming);
            }
            Some(_) => {}
        }
    }

    /// The strongest signal for a label; `None` renders neutral.
    pub fn cell(&self, label: &str) -> Option<GridSignal> {
        self.cells.get(label).copied()
    }

    pub fn rows() -> &'static [[&'static str; 6]; 3] {
        &GRID_LABELS
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
