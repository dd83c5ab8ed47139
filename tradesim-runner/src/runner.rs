//! Simulation runner: wires price source, risk profile, signal provider,
//! engine, statistics and sinks together.
//!
//! Two entry points:
//! - `run_simulation()`: loads data and risk profile from the config's paths,
//!   persists stop-loss ledgers and artifacts to disk. Used by the CLI.
//! - `run_with_sinks()`: takes a pre-loaded series and caller-supplied sinks.
//!   No file I/O of its own.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use tradesim_core::domain::{PriceSeries, RiskProfile};
use tradesim_core::engine::{Engine, EngineError, RunResult, StopLossHandler};

use crate::chart::{chart_title, ChartSink, CsvEquityChart};
use crate::config::{ConfigError, RunId, SimulationConfig, StrategyConfig};
use crate::data_loader::{load_price_csv, LoadError};
use crate::export::{artifact_dir, save_artifacts};
use crate::metrics::Statistics;
use crate::risk_profile::load_risk_profile;
use crate::stop_loss::CsvStopLossSink;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("simulation error: {0}")]
    Engine(#[from] EngineError),
    #[error("chart error: {0:#}")]
    Chart(anyhow::Error),
    #[error("export error: {0:#}")]
    Export(anyhow::Error),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete report of a single simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub strategy: StrategyConfig,
    pub strategy_label: String,
    pub risk_profile: RiskProfile,
    /// BLAKE3 over the input timestamps and prices.
    pub dataset_hash: String,
    pub statistics: Statistics,
    pub result: RunResult,
    /// Where the stop-loss ledger was appended, if the run stopped.
    pub stop_loss_path: Option<PathBuf>,
    /// Equity curve CSV written by the chart sink.
    pub equity_chart_path: Option<PathBuf>,
    /// Directory holding the exported artifacts, if exported.
    pub artifacts_dir: Option<PathBuf>,
}

/// Run a simulation from a config, reading inputs from and writing outputs to disk.
///
/// The stop-loss ledger goes to `config.stop_loss_dir`. When `output_dir` is
/// set, the equity chart, the trade ledger and the JSON report are written
/// into a per-run directory under it; otherwise only the equity chart is
/// written, next to the price file.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationReport, RunError> {
    config.validate()?;
    let risk = load_risk_profile(&config.risk_profile_path)?;
    let series = load_price_csv(&config.data_path)?;

    let label = config.strategy.build()?.label().to_string();
    let mut stop_sink = CsvStopLossSink::new(&config.stop_loss_dir, &config.symbol, &label);

    let run_dir = config
        .output_dir
        .as_deref()
        .map(|dir| artifact_dir(dir, config));
    let chart_dir = match &run_dir {
        Some(dir) => dir.clone(),
        None => default_chart_dir(&config.data_path),
    };
    let mut chart = CsvEquityChart::in_dir(&chart_dir, &config.symbol, config.strategy.name());

    let mut report = run_with_sinks(config, &series, risk, &mut stop_sink, Some(&mut chart))?;
    report.equity_chart_path = Some(chart.path().to_path_buf());

    if report.result.stopped() {
        report.stop_loss_path = Some(stop_sink.path().to_path_buf());
    }
    if let Some(dir) = run_dir {
        save_artifacts(&report, &dir).map_err(RunError::Export)?;
        report.artifacts_dir = Some(dir);
    }

    Ok(report)
}

/// Directory of the price file; the equity chart lands next to the data
/// when no output directory is configured.
fn default_chart_dir(data_path: &Path) -> PathBuf {
    match data_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Run a simulation on a pre-loaded series with caller-supplied sinks.
pub fn run_with_sinks(
    config: &SimulationConfig,
    series: &PriceSeries,
    risk: RiskProfile,
    stop_handler: &mut dyn StopLossHandler,
    chart: Option<&mut dyn ChartSink>,
) -> Result<SimulationReport, RunError> {
    let mut signal = config.strategy.build()?;
    let strategy_label = signal.label().to_string();
    let run_id = config.run_id();

    info!(
        run_id = %run_id,
        symbol = %config.symbol,
        strategy = %config.strategy,
        "running simulation"
    );

    let result = Engine::new(series, risk)?.run(signal.as_mut(), stop_handler)?;
    let statistics = Statistics::compute(&result, config.risk_free_rate);

    if let Some(chart) = chart {
        let curve: Vec<_> = result.equity_curve().collect();
        chart
            .render(&chart_title(&config.symbol, &strategy_label), &curve)
            .map_err(RunError::Chart)?;
    }

    Ok(SimulationReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        symbol: config.symbol.clone(),
        strategy: config.strategy,
        strategy_label,
        risk_profile: risk,
        dataset_hash: dataset_hash(series),
        statistics,
        result,
        stop_loss_path: None,
        equity_chart_path: None,
        artifacts_dir: None,
    })
}

/// BLAKE3 over every `(timestamp, price)` pair of the series.
pub fn dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for (ts, price) in series.timestamps().iter().zip(series.prices()) {
        hasher.update(&ts.timestamp().to_le_bytes());
        hasher.update(&price.to_bits().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
