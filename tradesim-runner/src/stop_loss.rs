//! Append-only CSV stop-loss ledger.
//!
//! One file per run identity, `<dir>/<symbol><strategy label>.csv`. Each
//! stopped run appends its whole ledger in a single write while holding a
//! process-wide lock, so runs sharing a file never interleave rows. The
//! header is written only when the file is empty.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;
use tradesim_core::domain::TradeRecord;
use tradesim_core::engine::{StopLossHandler, StopLossSinkError};

/// Column order of the stop-loss ledger.
pub const LEDGER_HEADER: [&str; 6] = [
    "timestamp",
    "kind",
    "price",
    "size",
    "realized_change",
    "bar_index",
];

static SINK_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Error)]
pub enum StopLossWriteError {
    #[error("cannot write stop-loss ledger {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode stop-loss ledger: {0}")]
    Csv(#[from] csv::Error),
}

/// CSV file sink for stopped runs.
#[derive(Debug, Clone)]
pub struct CsvStopLossSink {
    path: PathBuf,
}

impl CsvStopLossSink {
    pub fn new(dir: &Path, symbol: &str, strategy_label: &str) -> Self {
        Self {
            path: dir.join(format!("{symbol}{strategy_label}.csv")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `ledger` to the file, creating it (and its directory) if needed.
    pub fn append(&self, ledger: &[TradeRecord]) -> Result<(), StopLossWriteError> {
        let io_err = |source: io::Error| StopLossWriteError::Io {
            path: self.path.clone(),
            source,
        };

        let _guard = SINK_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        let is_empty = file.metadata().map_err(io_err)?.len() == 0;

        let buf = encode_ledger(ledger, is_empty)?;
        file.write_all(&buf).map_err(io_err)?;
        file.flush().map_err(io_err)?;

        info!(path = %self.path.display(), rows = ledger.len(), "stop-loss ledger persisted");
        Ok(())
    }
}

impl StopLossHandler for CsvStopLossSink {
    fn on_stop_loss(&mut self, ledger: &[TradeRecord]) -> Result<(), StopLossSinkError> {
        self.append(ledger)?;
        Ok(())
    }
}

/// Encode ledger rows as CSV, optionally preceded by the header.
pub fn encode_ledger(ledger: &[TradeRecord], with_header: bool) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    if with_header {
        wtr.write_record(LEDGER_HEADER)?;
    }
    for t in ledger {
        wtr.write_record([
            t.timestamp.to_rfc3339(),
            t.kind.to_string(),
            t.price.to_string(),
            t.size.to_string(),
            t.realized_change.map(|c| c.to_string()).unwrap_or_default(),
            t.bar_index.to_string(),
        ])?;
    }
    wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn stopped_ledger() -> Vec<TradeRecord> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        vec![
            TradeRecord::entry(t0, 0, 100.0, 10),
            TradeRecord::exit(t0 + Duration::days(1), 1, 90.0, 10, -100.0),
            TradeRecord::stop_loss(t0 + Duration::days(2), 2, 95.0, -100.0),
        ]
    }

    #[test]
    fn file_name_joins_symbol_and_label() {
        let sink = CsvStopLossSink::new(Path::new("assets"), "EURUSD=X", "Simple Moving Average");
        assert_eq!(
            sink.path(),
            Path::new("assets/EURUSD=XSimple Moving Average.csv")
        );
    }

    #[test]
    fn encodes_rows_with_blank_change_on_entries() {
        let text = String::from_utf8(encode_ledger(&stopped_ledger(), true).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,kind,price,size,realized_change,bar_index");
        assert_eq!(lines[1], "2024-01-02T00:00:00+00:00,entry,100,10,,0");
        assert_eq!(lines[2], "2024-01-03T00:00:00+00:00,exit,90,10,-100,1");
        assert_eq!(lines[3], "2024-01-04T00:00:00+00:00,stop_loss,95,0,-100,2");
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvStopLossSink::new(&dir.path().join("nested"), "SPY", "Moving Average CD");

        sink.append(&stopped_ledger()).unwrap();
        sink.append(&stopped_ledger()).unwrap();

        let text = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(text.lines().count(), 1 + 3 + 3);
        assert_eq!(text.matches("timestamp,kind").count(), 1);
    }

    #[test]
    fn concurrent_runs_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvStopLossSink::new(dir.path(), "SPY", "Simple Moving Average");

        std::thread::scope(|s| {
            for _ in 0..4 {
                let sink = sink.clone();
                s.spawn(move || {
                    for _ in 0..10 {
                        sink.append(&stopped_ledger()).unwrap();
                    }
                });
            }
        });

        let text = fs::read_to_string(sink.path()).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows.len(), 4 * 10 * 3);
        for chunk in rows.chunks(3) {
            assert!(chunk[0].contains(",entry,"));
            assert!(chunk[1].contains(",exit,"));
            assert!(chunk[2].contains(",stop_loss,"));
        }
    }

    #[test]
    fn acts_as_engine_handler() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvStopLossSink::new(dir.path(), "X", "Y");
        sink.on_stop_loss(&stopped_ledger()).unwrap();
        assert!(sink.path().exists());
    }
}
