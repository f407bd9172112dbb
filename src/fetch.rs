// =============================================================================
// Yahoo Finance REST Client — chunked historical data download
// =============================================================================
//
// Yahoo's v8 chart endpoint caps the range it will serve for intraday
// intervals, so a long request is split into fixed-size windows that are
// fetched one after another and concatenated in order.  No retry, no backoff:
// a failed chunk fails the whole download.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Default chunk size in days for intraday ranges.
pub const DEFAULT_CHUNK_DAYS: i64 = 30;

/// A single OHLCV bar returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Bar open time, Unix seconds (UTC).
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Split/dividend-adjusted close; falls back to `close` when the
    /// provider omits it.
    pub adj_close: f64,
    pub volume: u64,
}

impl Bar {
    /// Bar open time formatted as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub fn datetime_string(&self) -> String {
        match DateTime::from_timestamp(self.timestamp, 0) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.timestamp.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format (v8 chart API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
    adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    adjclose: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Yahoo Finance chart API client. Unauthenticated; only needs a browser-like
/// User-Agent to avoid being rejected.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");

        debug!("YahooClient initialised (base_url=https://query1.finance.yahoo.com)");

        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            client,
        }
    }

    /// Fetch one contiguous window of bars.
    ///
    /// `period1`/`period2` are Unix seconds; `interval` is a provider
    /// interval string such as `1h` or `1d`.
    #[instrument(skip(self), name = "yahoo::fetch_chunk")]
    pub async fn fetch_chunk(
        &self,
        symbol: &str,
        period1: i64,
        period2: i64,
        interval: &str,
    ) -> Result<Vec<Bar>> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval={}",
            self.base_url, symbol, period1, period2, interval
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET chart request failed")?;

        let status = resp.status();
        let body: ChartResponse = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response ({status})"))?;

        if let Some(err) = body.chart.error {
            anyhow::bail!("Yahoo chart API error [{}]: {}", err.code, err.description);
        }

        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .context("chart response contains no result")?;

        Ok(Self::bars_from_result(result))
    }

    /// Flatten the columnar chart payload into rows, skipping indices with a
    /// missing close (market holidays, partial bars).
    fn bars_from_result(result: ChartResult) -> Vec<Bar> {
        let Some(quote) = result.indicators.quote.into_iter().next() else {
            return Vec::new();
        };
        let adjclose = result
            .indicators
            .adjclose
            .and_then(|mut a| if a.is_empty() { None } else { Some(a.remove(0).adjclose) });

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let Some(close) = quote.close.get(i).copied().flatten() else {
                warn!(index = i, "skipping bar with missing close");
                continue;
            };
            bars.push(Bar {
                timestamp: ts,
                open: quote.open.get(i).copied().flatten().unwrap_or(close),
                high: quote.high.get(i).copied().flatten().unwrap_or(close),
                low: quote.low.get(i).copied().flatten().unwrap_or(close),
                close,
                adj_close: adjclose
                    .as_ref()
                    .and_then(|a| a.get(i).copied().flatten())
                    .unwrap_or(close),
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }
        bars
    }

    /// Fetch `[start_date, end_date)` in sequential `chunk_days` windows.
    ///
    /// Dates are `YYYY-MM-DD`.  Chunks are requested strictly one at a time
    /// and concatenated in chronological order; an empty chunk is skipped.
    pub async fn fetch_range(
        &self,
        symbol: &str,
        start_date: &str,
        end_date: &str,
        interval: &str,
        chunk_days: i64,
    ) -> Result<Vec<Bar>> {
        let mut start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        if start >= end {
            anyhow::bail!("start date {start_date} is not before end date {end_date}");
        }
        if chunk_days <= 0 {
            anyhow::bail!("chunk_days must be greater than 0 (got {chunk_days})");
        }

        let mut all_bars = Vec::new();
        while start < end {
            let mut chunk_end = start + Duration::days(chunk_days);
            if chunk_end > end {
                chunk_end = end;
            }

            info!(%symbol, from = %start, to = %chunk_end, "fetching chunk");
            let bars = self
                .fetch_chunk(symbol, unix_seconds(start), unix_seconds(chunk_end), interval)
                .await
                .with_context(|| format!("chunk {start} to {chunk_end} failed"))?;

            if bars.is_empty() {
                warn!(%symbol, from = %start, to = %chunk_end, "chunk returned no data");
            } else {
                all_bars.extend(bars);
            }

            start = chunk_end;
        }

        Ok(all_bars)
    }
}

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date}', expected YYYY-MM-DD"))
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// CSV persistence
// ---------------------------------------------------------------------------

/// Conventional filename for a saved download:
/// `{symbol}_hourly_{start}_to_{end}.csv`.
pub fn data_filename(symbol: &str, start_date: &str, end_date: &str) -> String {
    format!("{symbol}_hourly_{start_date}_to_{end_date}.csv")
}

/// Write bars to `path` as CSV with the conventional header.
pub fn save_csv(bars: &[Bar], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer
        .write_record(["Datetime", "Open", "High", "Low", "Close", "Adj Close", "Volume"])
        .context("failed to write CSV header")?;

    for bar in bars {
        writer
            .write_record(&[
                bar.datetime_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.adj_close.to_string(),
                bar.volume.to_string(),
            ])
            .context("failed to write CSV row")?;
    }

    writer.flush().context("failed to flush CSV writer")?;
    Ok(())
}

/// Download `[start_date, end_date)` of `interval` bars for `symbol` and save
/// them under `out_dir` using the conventional filename.
///
/// Returns the written path, or `None` when the provider had no data for the
/// whole range (reported, not fatal).
pub async fn fetch_and_save(
    client: &YahooClient,
    symbol: &str,
    start_date: &str,
    end_date: &str,
    interval: &str,
    chunk_days: i64,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    let bars = client
        .fetch_range(symbol, start_date, end_date, interval, chunk_days)
        .await?;

    if bars.is_empty() {
        warn!(%symbol, "no data retrieved, nothing to save");
        return Ok(None);
    }

    let path = out_dir.join(data_filename(symbol, start_date, end_date));
    save_csv(&bars, &path)?;
    info!(rows = bars.len(), path = %path.display(), "data saved");
    Ok(Some(path))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(json: serde_json::Value) -> ChartResult {
        serde_json::from_value(json).unwrap()
    }

    // ---- wire parsing ----------------------------------------------------

    #[test]
    fn parses_columnar_payload_into_bars() {
        let result = sample_result(serde_json::json!({
            "timestamp": [1704189600i64, 1704193200i64],
            "indicators": {
                "quote": [{
                    "open": [100.0, 101.5],
                    "high": [102.0, 102.5],
                    "low": [99.5, 101.0],
                    "close": [101.5, 102.0],
                    "volume": [1200u64, 900u64]
                }],
                "adjclose": [{ "adjclose": [101.4, 101.9] }]
            }
        }));

        let bars = YahooClient::bars_from_result(result);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 101.5);
        assert_eq!(bars[0].adj_close, 101.4);
        assert_eq!(bars[1].volume, 900);
    }

    #[test]
    fn skips_indices_with_missing_close() {
        let result = sample_result(serde_json::json!({
            "timestamp": [1i64, 2i64, 3i64],
            "indicators": {
                "quote": [{
                    "open": [1.0, null, 3.0],
                    "high": [1.0, null, 3.0],
                    "low": [1.0, null, 3.0],
                    "close": [1.0, null, 3.0],
                    "volume": [10u64, null, 30u64]
                }]
            }
        }));

        let bars = YahooClient::bars_from_result(result);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, 1);
        assert_eq!(bars[1].timestamp, 3);
        // No adjclose block: falls back to close.
        assert_eq!(bars[1].adj_close, 3.0);
    }

    // ---- date handling ---------------------------------------------------

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("2024-13-40").is_err());
        assert!(parse_date("17/01/2023").is_err());
        assert!(parse_date("2024-01-02").is_ok());
    }

    #[test]
    fn datetime_string_is_utc() {
        let bar = Bar {
            timestamp: 1704189600, // 2024-01-02 10:00:00 UTC
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            adj_close: 0.0,
            volume: 0,
        };
        assert_eq!(bar.datetime_string(), "2024-01-02 10:00:00");
    }

    // ---- filename convention ---------------------------------------------

    #[test]
    fn filename_follows_convention() {
        assert_eq!(
            data_filename("WMT", "2023-01-17", "2024-12-31"),
            "WMT_hourly_2023-01-17_to_2024-12-31.csv"
        );
    }

    // ---- csv round to disk -----------------------------------------------

    #[test]
    fn saved_csv_has_conventional_header() {
        let bars = vec![Bar {
            timestamp: 1704189600,
            open: 100.0,
            high: 102.0,
            low: 99.5,
            close: 101.5,
            adj_close: 101.4,
            volume: 1200,
        }];
        let path = std::env::temp_dir()
            .join(format!("ema-compare-{}-save.csv", std::process::id()));
        save_csv(&bars, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Datetime,Open,High,Low,Close,Adj Close,Volume"
        );
        assert!(lines.next().unwrap().starts_with("2024-01-02 10:00:00,"));
        std::fs::remove_file(path).ok();
    }
}
