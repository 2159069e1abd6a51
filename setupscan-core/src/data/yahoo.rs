//! Yahoo Finance price data provider.
//!
//! Fetches close-price bars from Yahoo's v8 chart API, one request per
//! ticker within a batch. Yahoo Finance has no official API and is subject
//! to unannounced format changes; response-shape problems surface as
//! per-ticker failures rather than aborting the batch.

use super::provider::{BatchFetch, DataError, PriceDataProvider, SeriesMap};
use crate::domain::{Bar, Resolution};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

/// Yahoo Finance provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Build the chart API URL for a ticker at a resolution.
    fn chart_url(ticker: &str, resolution: Resolution) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?interval={interval}&range={range}",
            interval = resolution.interval(),
            range = resolution.range(),
        )
    }

    /// Parse a chart response into bars, oldest first.
    ///
    /// Returns an empty vector for a ticker with no listing history in
    /// range ("Not Found", or a result with no rows).
    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
        let result = match resp.chart.result {
            Some(result) => result,
            None => {
                return match resp.chart.error {
                    Some(err) if err.code == "Not Found" => Ok(Vec::new()),
                    Some(err) => Err(DataError::ResponseFormatChanged(format!(
                        "{}: {}",
                        err.code, err.description
                    ))),
                    None => Err(DataError::ResponseFormatChanged(
                        "empty result with no error".into(),
                    )),
                };
            }
        };

        let data = match result.into_iter().next() {
            Some(data) => data,
            None => return Ok(Vec::new()),
        };

        let timestamps = match data.timestamp {
            Some(ts) => ts,
            None => return Ok(Vec::new()),
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("no quote data for {ticker}"))
            })?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            // Null closes are holidays / not-yet-settled rows.
            if let Some(close) = quote.close.get(i).copied().flatten() {
                bars.push(Bar::new(date, close));
            }
        }

        Ok(bars)
    }

    /// Fetch one ticker. Batch-level conditions (network, rate limit)
    /// come back as `Err`; everything else is a per-ticker outcome.
    fn fetch_ticker(&self, ticker: &str, resolution: Resolution) -> Result<Vec<Bar>, DataError> {
        let url = Self::chart_url(ticker, resolution);

        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                DataError::NetworkUnreachable(e.to_string())
            } else {
                DataError::Other(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(DataError::Other(format!("HTTP {status} for {ticker}")));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;

        Self::parse_response(ticker, chart)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_batch(
        &self,
        tickers: &[String],
        resolution: Resolution,
    ) -> Result<BatchFetch, DataError> {
        let mut series = SeriesMap::new();
        let mut failures = Vec::new();

        for ticker in tickers {
            match self.fetch_ticker(ticker, resolution) {
                Ok(bars) => {
                    series.insert(ticker.clone(), bars);
                }
                // Batch-level conditions abort: every remaining request
                // would hit the same wall.
                Err(e @ DataError::NetworkUnreachable(_))
                | Err(e @ DataError::RateLimited { .. }) => return Err(e),
                Err(e) => failures.push((ticker.clone(), e)),
            }
        }

        Ok(BatchFetch { series, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn chart_json(timestamps: &[i64], closes: &[Option<f64>]) -> ChartResponse {
        let closes_json: Vec<String> = closes
            .iter()
            .map(|c| c.map_or("null".to_string(), |v| v.to_string()))
            .collect();
        let json = format!(
            r#"{{"chart":{{"result":[{{"timestamp":{timestamps:?},
                "indicators":{{"quote":[{{"close":[{closes}]}}]}}}}],"error":null}}}}"#,
            closes = closes_json.join(","),
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn url_carries_interval_and_range() {
        let url = YahooProvider::chart_url("SPY", Resolution::Weekly);
        assert!(url.contains("/chart/SPY"));
        assert!(url.contains("interval=1wk"));
        assert!(url.contains("range=2y"));
    }

    #[test]
    fn parse_response_extracts_dated_closes() {
        // 2024-01-02 and 2024-01-03, midnight UTC.
        let resp = chart_json(&[1704153600, 1704240000], &[Some(470.5), Some(472.25)]);
        let bars = YahooProvider::parse_response("SPY", resp).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 470.5);
        assert_eq!(bars[1].close, 472.25);
    }

    #[test]
    fn parse_response_skips_null_closes() {
        let resp = chart_json(&[1704153600, 1704240000], &[None, Some(472.25)]);
        let bars = YahooProvider::parse_response("SPY", resp).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 472.25);
    }

    #[test]
    fn parse_response_not_found_means_no_data() {
        let json = r#"{"chart":{"result":null,
            "error":{"code":"Not Found","description":"No data found"}}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let bars = YahooProvider::parse_response("ZZZZ", resp).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn parse_response_other_error_surfaces() {
        let json = r#"{"chart":{"result":null,
            "error":{"code":"Internal","description":"boom"}}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let err = YahooProvider::parse_response("SPY", resp).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }
}
