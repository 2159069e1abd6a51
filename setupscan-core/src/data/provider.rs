//! Price data provider trait and structured error types.
//!
//! The trait abstracts over market-data sources so the orchestrator can be
//! tested against a mock provider. The snapshot store sits above this
//! trait — providers don't know about the cache.
//!
//! No provider retries automatically: a failed scan is rerun in full
//! (rerunning hits the snapshot store for everything already fetched).

use crate::domain::{Bar, Resolution};
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-ticker bar sequences for one batch request.
///
/// A ticker mapped to an empty `Vec` had no listing history in the
/// requested range — an explicit "no data", distinct from a failure.
pub type SeriesMap = BTreeMap<String, Vec<Bar>>;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of one batch fetch.
///
/// Per-ticker failures are carried alongside the series map so the caller
/// can record them without losing the rest of the batch.
#[derive(Debug, Default)]
pub struct BatchFetch {
    pub series: SeriesMap,
    pub failures: Vec<(String, DataError)>,
}

/// Trait for price data providers.
///
/// `Err` means the whole batch failed (network down, rate limited);
/// per-ticker problems belong in [`BatchFetch::failures`].
pub trait PriceDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch close-price bars for a batch of tickers at a resolution, over
    /// that resolution's lookback range.
    fn fetch_batch(&self, tickers: &[String], resolution: Resolution)
        -> Result<BatchFetch, DataError>;
}

/// Progress callbacks for a scan pass.
pub trait ScanProgress: Send {
    /// A fresh snapshot was served from the store.
    fn on_cache_hit(&self, cache_key: &str);

    /// A provider fetch is starting for the given universe size.
    fn on_fetch_start(&self, cache_key: &str, tickers: usize);

    /// One batch finished fetching.
    fn on_batch_fetched(&self, index: usize, batches: usize);

    /// A ticker was skipped and will be absent from the results.
    fn on_ticker_skipped(&self, ticker: &str, reason: &str);

    /// The scan pass completed.
    fn on_scan_complete(&self, label: &str, tops: usize, bottoms: usize, skipped: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl ScanProgress for StdoutProgress {
    fn on_cache_hit(&self, cache_key: &str) {
        println!("Using cached snapshot: {cache_key}");
    }

    fn on_fetch_start(&self, cache_key: &str, tickers: usize) {
        println!("Fetching fresh data for {cache_key} ({tickers} tickers)...");
    }

    fn on_batch_fetched(&self, index: usize, batches: usize) {
        println!("  batch {}/{batches} fetched", index + 1);
    }

    fn on_ticker_skipped(&self, ticker: &str, reason: &str) {
        eprintln!("WARNING: skipping {ticker}: {reason}");
    }

    fn on_scan_complete(&self, label: &str, tops: usize, bottoms: usize, skipped: usize) {
        println!("Scan {label} complete: {tops} tops, {bottoms} bottoms, {skipped} skipped");
    }
}

/// Progress reporter that discards everything (tests, quiet mode).
pub struct SilentProgress;

impl ScanProgress for SilentProgress {
    fn on_cache_hit(&self, _cache_key: &str) {}
    fn on_fetch_start(&self, _cache_key: &str, _tickers: usize) {}
    fn on_batch_fetched(&self, _index: usize, _batches: usize) {}
    fn on_ticker_skipped(&self, _ticker: &str, _reason: &str) {}
    fn on_scan_complete(&self, _label: &str, _tops: usize, _bottoms: usize, _skipped: usize) {}
}
