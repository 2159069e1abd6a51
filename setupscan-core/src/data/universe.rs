//! Ticker master data — the sector/industry directory.
//!
//! Loaded from CSV files with at least `Ticker,Sector,Industry` columns.
//! A missing file yields an empty directory with a diagnostic, never a
//! failure; a blank Sector or Industry defaults to `"Unknown"`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Label used when a ticker has no sector or industry on file.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct MasterRow {
    #[serde(rename = "Ticker")]
    ticker: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
}

/// Ticker → sector/industry lookup for one scan universe.
#[derive(Debug, Clone, Default)]
pub struct TickerDirectory {
    tickers: Vec<String>,
    sectors: BTreeMap<String, String>,
    industries: BTreeMap<String, String>,
}

impl TickerDirectory {
    /// Load a master-data CSV. A missing or unreadable file logs a
    /// diagnostic and returns an empty directory; malformed rows are
    /// skipped individually.
    pub fn load_csv(path: &Path) -> Self {
        let mut directory = Self::default();

        let mut reader = match csv::Reader::from_path(path) {
            Ok(reader) => reader,
            Err(e) => {
                eprintln!("WARNING: master data {} not loaded: {e}", path.display());
                return directory;
            }
        };

        for row in reader.deserialize::<MasterRow>() {
            match row {
                Ok(row) => directory.insert_row(row),
                Err(e) => eprintln!(
                    "WARNING: skipping malformed row in {}: {e}",
                    path.display()
                ),
            }
        }

        println!(
            "Loaded {} tickers from {}",
            directory.len(),
            path.display()
        );
        directory
    }

    fn insert_row(&mut self, row: MasterRow) {
        let ticker = match row.ticker.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return,
        };

        if !self.sectors.contains_key(&ticker) {
            self.tickers.push(ticker.clone());
        }
        self.sectors
            .insert(ticker.clone(), normalize_label(row.sector));
        self.industries.insert(ticker, normalize_label(row.industry));
    }

    /// Fold another directory into this one. Later files win per ticker;
    /// first-seen file order is preserved for the ticker list.
    pub fn merge(&mut self, other: TickerDirectory) {
        for ticker in other.tickers {
            if !self.sectors.contains_key(&ticker) {
                self.tickers.push(ticker.clone());
            }
            if let Some(sector) = other.sectors.get(&ticker) {
                self.sectors.insert(ticker.clone(), sector.clone());
            }
            if let Some(industry) = other.industries.get(&ticker) {
                self.industries.insert(ticker, industry.clone());
            }
        }
    }

    /// Tickers in file order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn sector_of(&self, ticker: &str) -> &str {
        self.sectors.get(ticker).map_or(UNKNOWN_LABEL, String::as_str)
    }

    pub fn industry_of(&self, ticker: &str) -> &str {
        self.industries
            .get(ticker)
            .map_or(UNKNOWN_LABEL, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

fn normalize_label(value: Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => UNKNOWN_LABEL.to_string(),
    }
}
