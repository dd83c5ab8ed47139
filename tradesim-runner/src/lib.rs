//! Tradesim Runner: simulation orchestration around `tradesim-core`.
//!
//! This crate builds on `tradesim-core` to provide:
//! - Price sources: CSV loader and Yahoo Finance downloader
//! - Risk profile loading (JSON or TOML)
//! - Run configuration and the strategy registry
//! - Statistics reporter (PnL, win rate, Sharpe-style ratio, drawdown)
//! - Append-only CSV stop-loss ledger
//! - Equity chart sinks and artifact export
//! - `run_simulation`, which wires all of the above around the engine

pub mod chart;
pub mod config;
pub mod data_loader;
pub mod download;
pub mod export;
pub mod metrics;
pub mod risk_profile;
pub mod runner;
pub mod stop_loss;

pub use chart::{chart_title, ChartSink, CsvEquityChart, RecordingChart};
pub use config::{ConfigError, RunId, SimulationConfig, StrategyConfig, STRATEGY_NAMES};
pub use data_loader::{load_price_csv, read_price_csv, LoadError};
pub use download::{download, DownloadError, YahooDownloader};
pub use metrics::{Statistics, StatisticsError, DEFAULT_RISK_FREE_RATE};
pub use risk_profile::load_risk_profile;
pub use runner::{run_simulation, run_with_sinks, RunError, SimulationReport, SCHEMA_VERSION};
pub use stop_loss::{CsvStopLossSink, StopLossWriteError};
