//! Price CSV loading.
//!
//! Reads the `Date,Close` layout written by the downloader. The timestamp
//! column may also be named `Datetime` or `timestamp` (intraday downloads);
//! header matching ignores case. Validation of the prices themselves
//! (finite, non-negative, strictly increasing timestamps) is left to
//! `PriceSeries` so violations surface as data-quality errors.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::debug;
use tradesim_core::domain::{PriceSeries, SeriesError, Timestamp};

const TIMESTAMP_COLUMNS: &[&str] = &["date", "datetime", "timestamp"];
const CLOSE_COLUMN: &str = "close";

/// Errors from the price loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: missing '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}: row {row}: unrecognized timestamp '{value}'", path.display())]
    BadTimestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("{}: row {row}: unparseable close price '{value}'", path.display())]
    BadPrice {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("{}: {source}", path.display())]
    Series {
        path: PathBuf,
        #[source]
        source: SeriesError,
    },
}

/// Load a price CSV file into a validated series.
pub fn load_price_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Csv {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let series = read_price_csv(file, path)?;
    debug!(path = %path.display(), bars = series.len(), "loaded price series");
    Ok(series)
}

/// Parse price CSV from any reader. `origin` is only used in error messages.
pub fn read_price_csv<R: io::Read>(reader: R, origin: &Path) -> Result<PriceSeries, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();

    let find = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };
    let ts_col = find(TIMESTAMP_COLUMNS).ok_or_else(|| LoadError::MissingColumn {
        path: origin.to_path_buf(),
        column: "Date",
    })?;
    let close_col = find(&[CLOSE_COLUMN]).ok_or_else(|| LoadError::MissingColumn {
        path: origin.to_path_buf(),
        column: "Close",
    })?;

    let mut timestamps = Vec::new();
    let mut prices = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_err)?;
        // Row numbers are 1-based and count the header.
        let row = i + 2;

        let raw_ts = record.get(ts_col).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::BadTimestamp {
            path: origin.to_path_buf(),
            row,
            value: raw_ts.to_string(),
        })?;

        let raw_close = record.get(close_col).unwrap_or_default();
        let price: f64 = raw_close.parse().map_err(|_| LoadError::BadPrice {
            path: origin.to_path_buf(),
            row,
            value: raw_close.to_string(),
        })?;

        timestamps.push(timestamp);
        prices.push(price);
    }

    PriceSeries::from_parallel(timestamps, prices).map_err(|source| LoadError::Series {
        path: origin.to_path_buf(),
        source,
    })
}

/// Parse a timestamp in any of the accepted layouts, normalized to UTC.
///
/// Accepted: RFC 3339, `YYYY-MM-DD HH:MM:SS±HH:MM`, `YYYY-MM-DD HH:MM:SS`
/// (taken as UTC) and `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
