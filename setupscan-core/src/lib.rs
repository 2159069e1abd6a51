//! SetupScan Core — domain types, counting engine, and data layer.
//!
//! This crate contains the heart of the scanner:
//! - Domain types (bars, price series, signal classification, resolutions)
//! - The sequential setup-counting engine and its exhaustion flags
//! - Series normalization (in-progress-week trimming, as-of dates)
//! - The price data provider trait and the Yahoo chart-API implementation
//! - The snapshot store (date-scoped, whole-record-replace price cache)
//! - Master-data loading (ticker → sector/industry directory)

pub mod data;
pub mod domain;
pub mod engine;
