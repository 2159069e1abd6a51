//! Scan orchestration — one resolution pass over a ticker universe.
//!
//! Flow: snapshot store hit, or batched provider fetch with an inter-batch
//! delay, then per-ticker normalize → evaluate → classify. Every per-ticker
//! problem becomes an explicit skip outcome on the result; nothing short of
//! a store failure aborts the pass.

use crate::aggregate::count_by_sector;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use setupscan_core::data::{
    PriceDataProvider, PriceSeriesStore, ScanProgress, SeriesMap, StoreError, TickerDirectory,
};
use setupscan_core::domain::{Direction, PriceSeries, Resolution, TickerSignal};
use setupscan_core::engine;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Knobs for one scan pass.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Tickers per provider request.
    pub batch_size: usize,
    /// Pause after each provider call, for the provider's rate limits.
    pub batch_delay: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            batch_size: 50,
            batch_delay: Duration::from_millis(1500),
        }
    }
}

/// Errors that abort a scan pass. Everything else degrades to a skip.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("snapshot store: {0}")]
    Store(#[from] StoreError),
}

/// A ticker that produced no result, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

/// The structured output of one resolution pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Resolution label, doubling as the snapshot cache key.
    pub label: String,
    pub resolution: Resolution,
    /// Latest fully-formed bar date observed across all tickers.
    pub as_of: Option<NaiveDate>,
    pub tops: Vec<TickerSignal>,
    pub bottoms: Vec<TickerSignal>,
    pub top_sectors: BTreeMap<String, u32>,
    pub bottom_sectors: BTreeMap<String, u32>,
    /// Tickers evaluated (signal or not).
    pub scanned: usize,
    pub skipped: Vec<SkippedTicker>,
}

/// Run one resolution pass over the directory's universe.
///
/// `today` is the current UTC date, injected for deterministic freshness
/// and week-boundary decisions.
#[allow(clippy::too_many_arguments)]
pub fn scan(
    directory: &TickerDirectory,
    label: &str,
    resolution: Resolution,
    store: &PriceSeriesStore,
    provider: &dyn PriceDataProvider,
    options: &ScanOptions,
    progress: &dyn ScanProgress,
    today: NaiveDate,
) -> Result<ScanResult, ScanError> {
    let (series_map, mut skipped) = load_or_fetch(
        directory, label, resolution, store, provider, options, progress, today,
    )?;

    let mut tops = Vec::new();
    let mut bottoms = Vec::new();
    let mut as_of: Option<NaiveDate> = None;
    let mut scanned = 0usize;

    for (ticker, bars) in &series_map {
        if bars.is_empty() {
            skipped.push(SkippedTicker {
                ticker: ticker.clone(),
                reason: "no price history in range".into(),
            });
            continue;
        }

        let series = match PriceSeries::new(bars.clone()) {
            Ok(series) => series,
            Err(e) => {
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let normalized = engine::normalize(series, resolution, today);
        if let Some(date) = engine::as_of(&normalized) {
            as_of = Some(as_of.map_or(date, |cur| cur.max(date)));
        }

        let flags = engine::evaluate(&normalized);
        scanned += 1;

        if !flags.any() {
            continue;
        }
        let last_close = match normalized.last() {
            Some(bar) => bar.close,
            None => continue,
        };
        let industry = directory.industry_of(ticker).to_string();

        if let Some(strength) = flags.strongest(Direction::Top) {
            tops.push(TickerSignal {
                ticker: ticker.clone(),
                last_close,
                strength,
                industry: industry.clone(),
            });
        }
        if let Some(strength) = flags.strongest(Direction::Bottom) {
            bottoms.push(TickerSignal {
                ticker: ticker.clone(),
                last_close,
                strength,
                industry,
            });
        }
    }

    for skip in &skipped {
        progress.on_ticker_skipped(&skip.ticker, &skip.reason);
    }

    tops.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    bottoms.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    let top_sectors = count_by_sector(&tops, directory);
    let bottom_sectors = count_by_sector(&bottoms, directory);

    progress.on_scan_complete(label, tops.len(), bottoms.len(), skipped.len());

    Ok(ScanResult {
        label: label.to_string(),
        resolution,
        as_of,
        tops,
        bottoms,
        top_sectors,
        bottom_sectors,
        scanned,
        skipped,
    })
}

/// Serve the universe's series from the store, or fetch it in batches and
/// replace the snapshot.
///
/// Provider failures never abort: a failed batch turns into skips for its
/// tickers, and whatever was fetched is still cached and scanned.
#[allow(clippy::too_many_arguments)]
fn load_or_fetch(
    directory: &TickerDirectory,
    label: &str,
    resolution: Resolution,
    store: &PriceSeriesStore,
    provider: &dyn PriceDataProvider,
    options: &ScanOptions,
    progress: &dyn ScanProgress,
    today: NaiveDate,
) -> Result<(SeriesMap, Vec<SkippedTicker>), ScanError> {
    if let Some(series) = store.load_fresh(label, resolution, today)? {
        progress.on_cache_hit(label);
        return Ok((series, Vec::new()));
    }

    let tickers = directory.tickers();
    progress.on_fetch_start(label, tickers.len());

    let mut series = SeriesMap::new();
    let mut skipped = Vec::new();

    let batches: Vec<&[String]> = tickers.chunks(options.batch_size.max(1)).collect();
    let batch_count = batches.len();

    for (i, batch) in batches.into_iter().enumerate() {
        match provider.fetch_batch(batch, resolution) {
            Ok(fetch) => {
                series.extend(fetch.series);
                for (ticker, error) in fetch.failures {
                    skipped.push(SkippedTicker {
                        ticker,
                        reason: error.to_string(),
                    });
                }
            }
            Err(e) => {
                for ticker in batch {
                    skipped.push(SkippedTicker {
                        ticker: ticker.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        progress.on_batch_fetched(i, batch_count);

        if !options.batch_delay.is_zero() {
            thread::sleep(options.batch_delay);
        }
    }

    store.replace(label, resolution, today, &series)?;
    Ok((series, skipped))
}
