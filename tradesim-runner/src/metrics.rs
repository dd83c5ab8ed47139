//! Statistics reporter: pure functions over a finished run.
//!
//! Every statistic is a pure function of the ledger, the equity history or
//! the return history. Degenerate inputs (no exits, too few returns, zero
//! volatility) are reported as `StatisticsError` by the individual functions
//! and as `None` in the aggregate `Statistics` record.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use tradesim_core::domain::{TradeKind, TradeRecord};
use tradesim_core::engine::RunResult;

/// Per-period risk-free rate subtracted from the mean return.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.015;

/// A statistic that is undefined for this run.
#[derive(Debug, Error, PartialEq)]
pub enum StatisticsError {
    #[error("win rate is undefined: the run has no exits")]
    NoExits,

    #[error("Sharpe ratio is undefined: {0} return samples, at least 2 required")]
    TooFewReturns(usize),

    #[error("Sharpe ratio is undefined: returns have zero standard deviation")]
    ZeroVolatility,
}

/// Summary statistics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub pnl: f64,
    /// Number of ledger rows, stop-loss row included.
    pub trade_count: usize,
    pub win_rate: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub final_equity: f64,
    pub total_return: f64,
    /// Largest peak-to-trough decline as a non-positive fraction.
    pub max_drawdown: f64,
}

impl Statistics {
    /// Compute all statistics from a run result.
    pub fn compute(result: &RunResult, risk_free_rate: f64) -> Self {
        let win_rate = win_rate(&result.ledger)
            .map_err(|e| warn!("{e}"))
            .ok();
        let sharpe_ratio = sharpe_ratio(&result.return_history, risk_free_rate)
            .map_err(|e| warn!("{e}"))
            .ok();
        let final_equity = result
            .equity_history
            .last()
            .copied()
            .unwrap_or(result.initial_capital);

        Self {
            pnl: result.pnl(),
            trade_count: result.ledger.len(),
            win_rate,
            sharpe_ratio,
            final_equity,
            total_return: total_return(result.initial_capital, final_equity),
            max_drawdown: max_drawdown(&result.equity_history),
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics:")?;
        writeln!(f, "  PnL:              {:.2}", self.pnl)?;
        writeln!(f, "  Number of Trades: {}", self.trade_count)?;
        writeln!(f, "  Winrate:          {}", OrUndefined(self.win_rate))?;
        writeln!(f, "  Sharpe Ratio:     {}", OrUndefined(self.sharpe_ratio))?;
        writeln!(f, "  Final Equity:     {:.2}", self.final_equity)?;
        writeln!(f, "  Total Return:     {:.2}%", self.total_return * 100.0)?;
        write!(f, "  Max Drawdown:     {:.2}%", self.max_drawdown * 100.0)
    }
}

struct OrUndefined(Option<f64>);

impl fmt::Display for OrUndefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.4}"),
            None => f.write_str("undefined"),
        }
    }
}

// ─── Individual statistic functions ────────────────────────────────

/// Winning exits over all exits.
pub fn win_rate(ledger: &[TradeRecord]) -> Result<f64, StatisticsError> {
    let exits: Vec<&TradeRecord> = ledger.iter().filter(|t| t.kind == TradeKind::Exit).collect();
    if exits.is_empty() {
        return Err(StatisticsError::NoExits);
    }
    let winners = exits.iter().filter(|t| t.is_winning_exit()).count();
    Ok(winners as f64 / exits.len() as f64)
}

/// `(mean(returns) − risk_free_rate) / stdev(returns)`, sample standard deviation.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Result<f64, StatisticsError> {
    if returns.len() < 2 {
        return Err(StatisticsError::TooFewReturns(returns.len()));
    }
    let std = std_dev(returns);
    if std == 0.0 {
        return Err(StatisticsError::ZeroVolatility);
    }
    Ok((mean_f64(returns) - risk_free_rate) / std)
}

/// Total return as a fraction: (final − initial) / initial.
pub fn total_return(initial_capital: f64, final_equity: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    (final_equity - initial_capital) / initial_capital
}

pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
