//! Snapshot store — the date-scoped price series cache.
//!
//! One JSON record per `(cache_key, resolution)` under the store root:
//! `{root}/{cache_key}_{interval}.json`. Each record is versioned and
//! carries a blake3 checksum over its series map, so corruption is
//! detectable and the format is portable.
//!
//! Freshness: a record is served verbatim when it was retrieved today
//! (UTC), or when today is a Saturday/Sunday and the record exists — the
//! market is closed, so age does not matter. Anything else is a miss; the
//! caller refetches and replaces the record wholly. There is no
//! incremental merge and no concurrent-writer protection: one scan
//! process at a time.

use super::provider::SeriesMap;
use crate::domain::Resolution;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bumped when the record schema changes; older records read as corrupt.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from the snapshot store.
///
/// `Corrupt` is deliberately fatal: a damaged cache record surfaces
/// instead of being silently served or silently refetched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt snapshot at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// The versioned on-disk cache record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub version: u32,
    pub cache_key: String,
    pub resolution: Resolution,
    pub retrieved_on: NaiveDate,
    pub series: SeriesMap,
    pub checksum: String,
}

/// Summary of one stored snapshot, for cache inspection commands.
#[derive(Debug, Clone)]
pub struct SnapshotStatus {
    pub path: PathBuf,
    pub cache_key: String,
    pub resolution: Resolution,
    pub retrieved_on: NaiveDate,
    pub ticker_count: usize,
}

/// The snapshot store.
pub struct PriceSeriesStore {
    root: PathBuf,
}

impl PriceSeriesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, cache_key: &str, resolution: Resolution) -> PathBuf {
        self.root
            .join(format!("{cache_key}_{}.json", resolution.interval()))
    }

    /// Load the series map for a key if a fresh record exists.
    ///
    /// `Ok(None)` means miss or stale — refetch and [`replace`]. A record
    /// that cannot be read back intact is an error, never a miss.
    ///
    /// [`replace`]: PriceSeriesStore::replace
    pub fn load_fresh(
        &self,
        cache_key: &str,
        resolution: Resolution,
        today: NaiveDate,
    ) -> Result<Option<SeriesMap>, StoreError> {
        let path = self.snapshot_path(cache_key, resolution);
        let record = match self.read_record(&path)? {
            Some(record) => record,
            None => return Ok(None),
        };

        if is_fresh(record.retrieved_on, today) {
            Ok(Some(record.series))
        } else {
            Ok(None)
        }
    }

    /// Persist a full series map, replacing any prior record for the key.
    ///
    /// Writes are atomic: serialize to a `.tmp` sibling, then rename.
    pub fn replace(
        &self,
        cache_key: &str,
        resolution: Resolution,
        today: NaiveDate,
        series: &SeriesMap,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::Io {
            path: self.root.clone(),
            source: e,
        })?;

        let record = SnapshotRecord {
            version: SNAPSHOT_VERSION,
            cache_key: cache_key.to_string(),
            resolution,
            retrieved_on: today,
            checksum: series_checksum(series)?,
            series: series.clone(),
        };

        let path = self.snapshot_path(cache_key, resolution);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_vec(&record).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            reason: format!("serialize record: {e}"),
        })?;
        fs::write(&tmp_path, json).map_err(|e| StoreError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io {
                path: path.clone(),
                source: e,
            }
        })?;

        Ok(())
    }

    /// Summaries of every snapshot under the root, sorted by file name.
    pub fn snapshots(&self) -> Result<Vec<SnapshotStatus>, StoreError> {
        let mut statuses = Vec::new();
        if !self.root.exists() {
            return Ok(statuses);
        }

        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::Io {
            path: self.root.clone(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io {
                path: self.root.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = self.read_record(&path)? {
                statuses.push(SnapshotStatus {
                    path,
                    cache_key: record.cache_key,
                    resolution: record.resolution,
                    retrieved_on: record.retrieved_on,
                    ticker_count: record.series.len(),
                });
            }
        }

        statuses.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(statuses)
    }

    /// Read and validate one record; `Ok(None)` when the file is absent.
    fn read_record(&self, path: &Path) -> Result<Option<SnapshotRecord>, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let record: SnapshotRecord =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("invalid JSON: {e}"),
            })?;

        if record.version != SNAPSHOT_VERSION {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "version {} (expected {SNAPSHOT_VERSION})",
                    record.version
                ),
            });
        }

        let expected = series_checksum(&record.series)?;
        if record.checksum != expected {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: "checksum mismatch".into(),
            });
        }

        Ok(Some(record))
    }
}

/// Blake3 over the canonical JSON encoding of the series map.
fn series_checksum(series: &SeriesMap) -> Result<String, StoreError> {
    let bytes = serde_json::to_vec(series).map_err(|e| StoreError::Corrupt {
        path: PathBuf::new(),
        reason: format!("serialize series for checksum: {e}"),
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Same-day records are fresh; on UTC weekends any record is fresh.
fn is_fresh(retrieved_on: NaiveDate, today: NaiveDate) -> bool {
    retrieved_on == today
        || matches!(today.weekday(), Weekday::Sat | Weekday::Sun)
}
