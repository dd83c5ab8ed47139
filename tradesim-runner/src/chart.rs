//! Equity chart sinks.
//!
//! The engine's equity history is handed over as `(timestamp, equity)` pairs
//! with a title of the form `"<asset> <strategy label>"`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tradesim_core::domain::Timestamp;

/// Receives the equity curve of a finished run.
pub trait ChartSink {
    fn render(&mut self, title: &str, curve: &[(Timestamp, f64)]) -> Result<()>;
}

/// Chart title for an asset and strategy label.
pub fn chart_title(asset: &str, strategy_label: &str) -> String {
    format!("{asset} {strategy_label}")
}

/// Writes the curve as a two-column CSV; the equity column is named after
/// the chart title so plotting tools pick it up as the series label.
#[derive(Debug, Clone)]
pub struct CsvEquityChart {
    path: PathBuf,
}

impl CsvEquityChart {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<asset>_<strategy>_equity.csv`
    pub fn in_dir(dir: &Path, asset: &str, strategy: &str) -> Self {
        Self::new(dir.join(format!("{asset}_{strategy}_equity.csv")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChartSink for CsvEquityChart {
    fn render(&mut self, title: &str, curve: &[(Timestamp, f64)]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut wtr = csv::Writer::from_path(&self.path)
            .with_context(|| format!("failed to create {}", self.path.display()))?;
        wtr.write_record(["timestamp", title])?;
        for (ts, equity) in curve {
            wtr.write_record([ts.to_rfc3339(), format!("{equity:.2}")])?;
        }
        wtr.flush()
            .with_context(|| format!("failed to flush {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps the last rendered chart in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingChart {
    pub title: Option<String>,
    pub curve: Vec<(Timestamp, f64)>,
    pub renders: usize,
}

impl RecordingChart {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartSink for RecordingChart {
    fn render(&mut self, title: &str, curve: &[(Timestamp, f64)]) -> Result<()> {
        self.title = Some(title.to_string());
        self.curve = curve.to_vec();
        self.renders += 1;
        Ok(())
    }
}
