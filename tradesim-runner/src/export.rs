//! Artifact export: JSON report and flat trade ledger.
//!
//! Each run with an output directory gets its own subdirectory, named after
//! the symbol, the strategy and a prefix of the run id, holding:
//! - `report.json`: the full `SimulationReport`
//! - `trades.csv`: the trade ledger, same columns as the stop-loss ledger
//! - `<symbol>_<strategy>_equity.csv`: written by the equity chart sink

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tradesim_core::domain::TradeRecord;

use crate::config::SimulationConfig;
use crate::runner::SimulationReport;
use crate::stop_loss::encode_ledger;

const RUN_ID_PREFIX_LEN: usize = 12;

/// Per-run artifact directory under `output_dir`.
pub fn artifact_dir(output_dir: &Path, config: &SimulationConfig) -> PathBuf {
    let run_id = config.run_id();
    let short = &run_id[..RUN_ID_PREFIX_LEN.min(run_id.len())];
    output_dir.join(format!(
        "{}_{}_{short}",
        config.symbol,
        config.strategy.name()
    ))
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `SimulationReport` to pretty JSON.
pub fn export_json(report: &SimulationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize SimulationReport to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade ledger as CSV with a header row.
///
/// Columns: timestamp, kind, price, size, realized_change, bar_index
pub fn export_ledger_csv(ledger: &[TradeRecord]) -> Result<String> {
    let data = encode_ledger(ledger, true).context("failed to encode trade ledger")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `report.json` and `trades.csv` into `run_dir`, creating it if needed.
pub fn save_artifacts(report: &SimulationReport, run_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    let json_path = run_dir.join("report.json");
    std::fs::write(&json_path, json)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    let trades = export_ledger_csv(&report.result.ledger)?;
    let trades_path = run_dir.join("trades.csv");
    std::fs::write(&trades_path, trades)
        .with_context(|| format!("failed to write {}", trades_path.display()))?;

    Ok(run_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use chrono::{TimeZone, Utc};

    #[test]
    fn artifact_dir_is_deterministic() {
        let cfg = SimulationConfig::new("SPY", StrategyConfig::default(), "d.csv", "r.json");
        let a = artifact_dir(Path::new("out"), &cfg);
        assert_eq!(a, artifact_dir(Path::new("out"), &cfg));
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("SPY_sma_crossover_"));
        assert_eq!(name.len(), "SPY_sma_crossover_".len() + RUN_ID_PREFIX_LEN);
    }

    #[test]
    fn ledger_csv_has_header_and_rows() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let csv = export_ledger_csv(&[TradeRecord::entry(ts, 2, 100.0, 10)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "timestamp,kind,price,size,realized_change,bar_index");
        assert!(lines[1].ends_with(",entry,100,10,,2"));
    }

    #[test]
    fn empty_ledger_is_header_only() {
        let csv = export_ledger_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
