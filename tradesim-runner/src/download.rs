//! Yahoo Finance downloader.
//!
//! Fetches close prices from Yahoo's v8 chart API for a range (`1d`, `5d`,
//! `1mo`, `1y`, ...) and interval (`1d`, `1h`, `5m`, ...), drops bars without
//! a close, and writes a `Date,Close` CSV the data loader can read back.
//! Retries with exponential backoff on connection errors, timeouts, rate
//! limiting and non-success statuses.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use tradesim_core::domain::PricePoint;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Errors from the download layer.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// ─── Chart API response ─────────────────────────────────────────────

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

/// Parse a chart API JSON body into close-price points.
///
/// Bars with a missing or non-finite close are dropped.
pub fn parse_chart_response(symbol: &str, body: &str) -> Result<Vec<PricePoint>, DownloadError> {
    let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
        DownloadError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
    })?;

    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => DownloadError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => DownloadError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DownloadError::ResponseFormatChanged("empty result with no error".into()),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DownloadError::ResponseFormatChanged("result array is empty".into()))?;

    let timestamps = data
        .timestamp
        .ok_or_else(|| DownloadError::ResponseFormatChanged("no timestamps".into()))?;

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DownloadError::ResponseFormatChanged("no quote data".into()))?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let timestamp = chrono::DateTime::from_timestamp(ts, 0).ok_or_else(|| {
            DownloadError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
        })?;
        match quote.close.get(i).copied().flatten() {
            Some(price) if price.is_finite() => points.push(PricePoint { timestamp, price }),
            _ => continue,
        }
    }

    let dropped = timestamps.len() - points.len();
    if dropped > 0 {
        debug!(symbol, dropped, "dropped bars without a close");
    }

    if points.is_empty() {
        return Err(DownloadError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    Ok(points)
}

// ─── Provider ───────────────────────────────────────────────────────

/// Yahoo Finance chart API client.
pub struct YahooDownloader {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooDownloader {
    pub fn new() -> Result<Self, DownloadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DownloadError::NetworkUnreachable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Point the client at another chart endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    fn chart_url(&self, symbol: &str, period: &str, interval: &str) -> String {
        format!(
            "{}/{symbol}?range={period}&interval={interval}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Fetch close prices with retry and backoff.
    pub fn fetch(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, DownloadError> {
        let url = self.chart_url(symbol, period, interval);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, ?delay, "retrying download");
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        warn!(symbol, retry_after, "rate limited");
                        last_error = Some(DownloadError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DownloadError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if !status.is_success() {
                        last_error = Some(DownloadError::Http {
                            status: status.as_u16(),
                            symbol: symbol.to_string(),
                        });
                        continue;
                    }

                    let body = resp
                        .text()
                        .map_err(|e| DownloadError::NetworkUnreachable(e.to_string()))?;
                    return parse_chart_response(symbol, &body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DownloadError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DownloadError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DownloadError::NetworkUnreachable("max retries exceeded".into())))
    }
}

// ─── CSV output ─────────────────────────────────────────────────────

/// `<ticker>_<period>_<interval>.csv`, with a trailing `=X` stripped from
/// forex tickers.
pub fn data_file_name(ticker: &str, period: &str, interval: &str) -> String {
    let base = ticker.strip_suffix("=X").unwrap_or(ticker);
    format!("{base}_{period}_{interval}.csv")
}

/// Intraday intervals (minutes or hours) keep the time of day.
fn is_intraday(interval: &str) -> bool {
    (interval.ends_with('m') && !interval.ends_with("mo")) || interval.ends_with('h')
}

/// Write points as a `Date,Close` CSV.
pub fn write_price_csv(path: &Path, points: &[PricePoint], intraday: bool) -> Result<(), DownloadError> {
    let write_err = |source: csv::Error| DownloadError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut wtr = csv::Writer::from_path(path).map_err(write_err)?;
    wtr.write_record(["Date", "Close"]).map_err(write_err)?;
    for p in points {
        let date = if intraday {
            p.timestamp.to_rfc3339()
        } else {
            p.timestamp.format("%Y-%m-%d").to_string()
        };
        wtr.write_record([date, p.price.to_string()]).map_err(write_err)?;
    }
    wtr.flush().map_err(|e| write_err(csv::Error::from(e)))?;
    Ok(())
}

/// Download `ticker` and write it under `outdir`. Returns the written path.
pub fn download(
    downloader: &YahooDownloader,
    outdir: &Path,
    ticker: &str,
    period: &str,
    interval: &str,
) -> Result<PathBuf, DownloadError> {
    let points = downloader.fetch(ticker, period, interval)?;

    fs::create_dir_all(outdir).map_err(|e| DownloadError::Write {
        path: outdir.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let path = outdir.join(data_file_name(ticker, period, interval));
    write_price_csv(&path, &points, is_intraday(interval))?;

    info!(ticker, bars = points.len(), path = %path.display(), "downloaded price data");
    Ok(path)
}
