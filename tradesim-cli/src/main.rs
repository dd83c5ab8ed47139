//! Tradesim CLI: download and run commands.
//!
//! Commands:
//! - `download`: fetch close prices from Yahoo Finance into a `Date,Close` CSV
//! - `run`: simulate a strategy over a price CSV (downloading it first
//!   unless `--data` is given) and print the statistics

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tradesim_core::engine::RunOutcome;
use tradesim_runner::{
    download, run_simulation, SimulationConfig, SimulationReport, StrategyConfig,
    YahooDownloader,
};

#[derive(Parser)]
#[command(
    name = "tradesim",
    about = "Tradesim CLI: single-asset trading strategy simulator"
)]
struct Cli {
    /// Log engine transitions (DEBUG level).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download close prices from Yahoo Finance into a CSV file.
    Download {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Simulate a strategy and print its statistics.
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Existing price CSV to use instead of downloading.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Risk management profile (JSON or TOML).
        #[arg(short, long, default_value = "assets/risk_management_profile.json")]
        rprofile: PathBuf,

        /// Strategy name: sma_crossover (alias "simple moving average") or macd.
        #[arg(short, long, default_value = "sma_crossover")]
        strategy: String,

        /// TOML run config. Replaces the ticker, data, profile and strategy flags.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for the JSON report, trade ledger and equity chart.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Directory of the append-only stop-loss ledgers.
        #[arg(long)]
        stop_loss_dir: Option<PathBuf>,
    },
}

/// Where price data comes from.
#[derive(clap::Args)]
struct SourceArgs {
    /// Ticker to retrieve, e.g. EURUSD=X.
    #[arg(short, long, default_value = "EURUSD=X")]
    ticker: String,

    /// Period to retrieve, e.g. 1y, 5d.
    #[arg(short, long, default_value = "1y")]
    period: String,

    /// Bar interval, e.g. 1d, 1h.
    #[arg(short, long, default_value = "1d")]
    interval: String,

    /// Directory the downloaded CSV is written to.
    #[arg(short, long, default_value = "assets/forex_data")]
    outdir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Download { source } => {
            let path = fetch(&source)?;
            println!("Price data written to: {}", path.display());
            Ok(())
        }
        Commands::Run {
            source,
            data,
            rprofile,
            strategy,
            config,
            output_dir,
            stop_loss_dir,
        } => {
            let mut sim_config = match config {
                Some(path) => SimulationConfig::load(&path)?,
                None => {
                    let strategy = StrategyConfig::from_name(&strategy)?;
                    let data_path = match data {
                        Some(path) => path,
                        None => fetch(&source)?,
                    };
                    SimulationConfig::new(source.ticker, strategy, data_path, rprofile)
                }
            };
            if output_dir.is_some() {
                sim_config.output_dir = output_dir;
            }
            if let Some(dir) = stop_loss_dir {
                sim_config.stop_loss_dir = dir;
            }

            let report = run_simulation(&sim_config)?;
            print_summary(&report);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fetch(source: &SourceArgs) -> Result<PathBuf> {
    let downloader = YahooDownloader::new()?;
    download(
        &downloader,
        &source.outdir,
        &source.ticker,
        &source.period,
        &source.interval,
    )
    .with_context(|| format!("failed to download {}", source.ticker))
}

fn print_summary(report: &SimulationReport) {
    println!();
    println!("{} {}", report.symbol, report.strategy_label);
    println!("Run ID: {}", &report.run_id[..12.min(report.run_id.len())]);
    println!("Bars:   {}", report.result.bars_processed());
    println!();
    println!("{}", report.statistics);

    if let RunOutcome::Stopped { bar_index } = report.result.outcome {
        println!();
        println!("Stop Loss Occurred at bar {bar_index}.");
        if let Some(path) = &report.stop_loss_path {
            println!("Ledger appended to: {}", path.display());
        }
    }
    if let Some(pos) = &report.result.open_position {
        println!();
        println!(
            "Open position at end of run: {} units from {:.4} (bar {})",
            pos.size, pos.entry_price, pos.entry_bar
        );
    }
    if let Some(path) = &report.equity_chart_path {
        println!();
        println!("Equity curve written to: {}", path.display());
    }
    if let Some(dir) = &report.artifacts_dir {
        println!();
        println!("Artifacts saved to: {}", dir.display());
    }
}
