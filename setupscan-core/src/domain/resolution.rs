//! Resolution — the sampling period of a price series.

use serde::{Deserialize, Serialize};

/// Daily or weekly bars. Carries the provider tokens for each resolution:
/// the chart-API interval, the lookback range, and the report label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Daily,
    Weekly,
}

impl Resolution {
    /// Provider interval token.
    pub fn interval(&self) -> &'static str {
        match self {
            Resolution::Daily => "1d",
            Resolution::Weekly => "1wk",
        }
    }

    /// Lookback window requested from the provider: 6 months of daily
    /// bars, 2 years of weekly bars.
    pub fn range(&self) -> &'static str {
        match self {
            Resolution::Daily => "6mo",
            Resolution::Weekly => "2y",
        }
    }

    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Daily => "1D",
            Resolution::Weekly => "1W",
        }
    }
}
