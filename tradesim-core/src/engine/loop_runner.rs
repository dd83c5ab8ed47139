//! Bar-by-bar engine loop.

use crate::domain::{PriceSeries, RiskProfile, TradeRecord};
use crate::signal::{Signal, SignalProvider};
use tracing::{debug, info, warn};

use super::error::EngineError;
use super::state::{EngineState, RunOutcome, RunResult};
use super::stop::StopLossHandler;

/// One simulation run over a validated price series.
///
/// The engine borrows the series immutably for its lifetime and owns all
/// mutable run state. It is single-use: `run` consumes it.
pub struct Engine<'a> {
    series: &'a PriceSeries,
    risk: RiskProfile,
    state: EngineState,
}

impl<'a> Engine<'a> {
    /// Validate the risk profile and initialize capital, a FLAT position and
    /// empty histories.
    pub fn new(series: &'a PriceSeries, risk: RiskProfile) -> Result<Self, EngineError> {
        risk.validate()?;
        Ok(Self {
            series,
            risk,
            state: EngineState::new(risk.initial_capital),
        })
    }

    /// Drive the loop to completion or to the stop-loss.
    pub fn run(
        mut self,
        signal: &mut dyn SignalProvider,
        stop_handler: &mut dyn StopLossHandler,
    ) -> Result<RunResult, EngineError> {
        let series = self.series;
        let threshold = self.risk.loss_threshold();

        info!(
            strategy = signal.name(),
            bars = series.len(),
            initial_capital = self.risk.initial_capital,
            "simulation started"
        );

        let mut outcome = RunOutcome::Completed;

        for i in 0..series.len() {
            let price = series.price(i);
            let timestamp = series.timestamp(i);

            // ─── Stop check ───
            if -self.state.total_realized_loss > threshold {
                let record = TradeRecord::stop_loss(timestamp, i, price, self.state.total_realized_loss);
                self.state.ledger.push(record);
                info!(
                    bar = i,
                    cumulative_loss = self.state.total_realized_loss,
                    threshold,
                    "loss cap breached, stopping run"
                );
                stop_handler
                    .on_stop_loss(&self.state.ledger)
                    .map_err(|e| EngineError::StopLossSink(e.to_string()))?;
                outcome = RunOutcome::Stopped { bar_index: i };
                break;
            }

            // ─── Equity accounting ───
            let equity = self.state.equity_at(price);
            if !equity.is_finite() {
                return Err(EngineError::NonFiniteEquity { bar_index: i, equity });
            }
            if let Some(&prev) = self.state.equity_history.last() {
                if prev == 0.0 {
                    warn!(bar = i, "prior equity is zero, skipping return sample");
                } else {
                    self.state.return_history.push((equity - prev) / prev);
                }
            }
            self.state.equity_history.push(equity);

            // ─── Signal ───
            signal.update(series, i);
            let classification = signal.classify(series, i, self.state.position_state());

            // ─── Transitions ───
            match classification {
                Signal::Bullish if self.state.position.is_none() => {
                    if price <= 0.0 {
                        return Err(EngineError::NonPositiveEntryPrice { bar_index: i, price });
                    }
                    let pos = self.state.open(i, price, self.risk.position_limit);
                    self.state
                        .ledger
                        .push(TradeRecord::entry(timestamp, i, price, pos.size));
                    debug!(bar = i, price, size = pos.size, "entry");
                }
                Signal::Bearish => {
                    if let Some((pos, change)) = self.state.close(price) {
                        self.state
                            .ledger
                            .push(TradeRecord::exit(timestamp, i, price, pos.size, change));
                        debug!(bar = i, price, size = pos.size, realized_change = change, "exit");
                    }
                }
                _ => {}
            }
        }

        if let Some(pos) = &self.state.position {
            if outcome == RunOutcome::Completed {
                warn!(
                    entry_bar = pos.entry_bar,
                    size = pos.size,
                    "run ended with an open position"
                );
            }
        }

        let accounted = self.state.equity_history.len();
        let state = self.state;
        let result = RunResult {
            initial_capital: self.risk.initial_capital,
            final_capital: state.capital,
            total_realized_profit: state.total_realized_profit,
            total_realized_loss: state.total_realized_loss,
            ledger: state.ledger,
            equity_history: state.equity_history,
            return_history: state.return_history,
            timestamps: series.timestamps()[..accounted].to_vec(),
            open_position: state.position,
            outcome,
        };

        info!(
            bars = accounted,
            trades = result.ledger.len(),
            pnl = result.pnl(),
            stopped = result.stopped(),
            "simulation finished"
        );

        Ok(result)
    }
}
