//! Serializable scan configuration.

use crate::sentiment::DEFAULT_SENTIMENT_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for a full scan run.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Master-data CSV files making up the scan universe.
    pub universe_files: Vec<PathBuf>,

    /// Optional curated sector/industry ETF file for the grid scan.
    pub sector_file: Option<PathBuf>,

    /// Snapshot store root.
    pub cache_dir: PathBuf,

    /// Report artifact directory.
    pub output_dir: PathBuf,

    /// Sentiment history CSV path.
    pub history_file: PathBuf,

    /// Tickers per provider request.
    pub batch_size: usize,

    /// Pause between provider requests, in milliseconds.
    pub batch_delay_ms: u64,

    /// Sentiment index endpoint.
    pub sentiment_url: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            universe_files: Vec::new(),
            sector_file: None,
            cache_dir: PathBuf::from("cache"),
            output_dir: PathBuf::from("reports"),
            history_file: PathBuf::from("fear_and_greed_history.csv"),
            batch_size: 50,
            batch_delay_ms: 1500,
            sentiment_url: DEFAULT_SENTIMENT_URL.to_string(),
        }
    }
}

impl ScanConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
