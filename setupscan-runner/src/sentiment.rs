//! Sentiment index client.
//!
//! One GET against the fear-and-greed endpoint. Any failure — network,
//! HTTP status, JSON shape — degrades to [`SentimentReading::Unavailable`]
//! so the report carries an explicit sentinel; a sentiment outage never
//! aborts a scan. The history log is appended only on success.

use crate::history::{HistoryRow, SentimentHistory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default endpoint for the CNN fear-and-greed index.
pub const DEFAULT_SENTIMENT_URL: &str =
    "https://production.dataviz.cnn.io/index/fearandgreed/graphdata";

/// Current sentiment, or the explicit unavailable sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentReading {
    Available {
        score: i64,
        previous_close: i64,
        date: String,
    },
    Unavailable,
}

impl SentimentReading {
    pub fn is_available(&self) -> bool {
        matches!(self, SentimentReading::Available { .. })
    }
}

#[derive(Debug, Deserialize)]
struct GraphData {
    fear_and_greed: FearAndGreed,
}

#[derive(Debug, Deserialize)]
struct FearAndGreed {
    score: f64,
    previous_close: f64,
    timestamp: String,
}

/// Blocking sentiment index client.
pub struct SentimentClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl SentimentClient {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch the current reading. Total: failures come back as
    /// `Unavailable`, never as an error.
    ///
    /// `today` is the fallback date when the endpoint's timestamp cannot
    /// be parsed.
    pub fn fetch(&self, today: NaiveDate) -> SentimentReading {
        match self.try_fetch(today) {
            Ok(reading) => reading,
            Err(reason) => {
                eprintln!("WARNING: sentiment index unavailable: {reason}");
                SentimentReading::Unavailable
            }
        }
    }

    /// Fetch and, on success, append to the history log. A history write
    /// failure downgrades to a warning — the reading is still returned.
    pub fn fetch_and_log(&self, history: &SentimentHistory, today: NaiveDate) -> SentimentReading {
        let reading = self.fetch(today);
        if let SentimentReading::Available {
            score,
            previous_close,
            ref date,
        } = reading
        {
            let row = HistoryRow {
                date: date.clone(),
                index: score,
                previous_close,
            };
            if let Err(e) = history.append(&row) {
                eprintln!("WARNING: could not append sentiment history: {e}");
            }
        }
        reading
    }

    fn try_fetch(&self, today: NaiveDate) -> Result<SentimentReading, String> {
        let resp = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        let data: GraphData = resp.json().map_err(|e| e.to_string())?;
        let current = data.fear_and_greed;

        Ok(SentimentReading::Available {
            score: current.score.round() as i64,
            previous_close: current.previous_close.round() as i64,
            date: timestamp_date(&current.timestamp, today),
        })
    }
}

/// Date portion of an ISO-8601-ish timestamp; falls back to `today` when
/// the timestamp cannot be parsed.
fn timestamp_date(timestamp: &str, today: NaiveDate) -> String {
    let normalized = timestamp.replace('Z', "+00:00");
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&normalized) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Some(prefix) = timestamp.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    today.format("%Y-%m-%d").to_string()
}
