//! Engine-owned mutable state and the run result.

use crate::domain::{position_size, OpenPosition, PositionState, Timestamp, TradeRecord};
use serde::Serialize;

/// Mutable state that evolves bar-by-bar during the engine loop.
///
/// Each accumulator has a single mutation point: `open` touches only the
/// position, `close` touches only capital and the realized totals.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub capital: f64,
    pub position: Option<OpenPosition>,
    /// Sum of non-negative realized changes.
    pub total_realized_profit: f64,
    /// Sum of negative realized changes (never positive).
    pub total_realized_loss: f64,
    pub equity_history: Vec<f64>,
    pub return_history: Vec<f64>,
    pub ledger: Vec<TradeRecord>,
}

impl EngineState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            capital: initial_capital,
            position: None,
            total_realized_profit: 0.0,
            total_realized_loss: 0.0,
            equity_history: Vec::new(),
            return_history: Vec::new(),
            ledger: Vec::new(),
        }
    }

    pub fn position_state(&self) -> PositionState {
        match self.position {
            Some(_) => PositionState::Long,
            None => PositionState::Flat,
        }
    }

    /// Capital plus the unrealized change of any open position at `price`.
    pub fn equity_at(&self, price: f64) -> f64 {
        match &self.position {
            Some(pos) => self.capital + pos.unrealized_change(price),
            None => self.capital,
        }
    }

    /// Open a LONG position. Capital is untouched: exposure is notional.
    pub(crate) fn open(&mut self, bar_index: usize, price: f64, position_limit: f64) -> OpenPosition {
        let pos = OpenPosition {
            entry_bar: bar_index,
            entry_price: price,
            size: position_size(self.capital, position_limit, price),
        };
        self.position = Some(pos);
        pos
    }

    /// Close the open position at `price` and realize its change.
    pub(crate) fn close(&mut self, price: f64) -> Option<(OpenPosition, f64)> {
        let pos = self.position.take()?;
        let change = pos.unrealized_change(price);
        self.capital += change;
        if change >= 0.0 {
            self.total_realized_profit += change;
        } else {
            self.total_realized_loss += change;
        }
        Some((pos, change))
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every bar was processed.
    Completed,
    /// The loss cap was breached; `bar_index` is the bar the stop fired on.
    Stopped { bar_index: usize },
}

/// Everything a finished run hands to statistics, charting and export.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_realized_profit: f64,
    pub total_realized_loss: f64,
    pub ledger: Vec<TradeRecord>,
    pub equity_history: Vec<f64>,
    pub return_history: Vec<f64>,
    /// Timestamps of the accounted bars; truncated at the stop bar.
    pub timestamps: Vec<Timestamp>,
    /// Position still open after the final bar, if the signal left one.
    pub open_position: Option<OpenPosition>,
    pub outcome: RunOutcome,
}

impl RunResult {
    /// Realized profit plus realized loss.
    pub fn pnl(&self) -> f64 {
        self.total_realized_profit + self.total_realized_loss
    }

    pub fn stopped(&self) -> bool {
        matches!(self.outcome, RunOutcome::Stopped { .. })
    }

    pub fn bars_processed(&self) -> usize {
        self.equity_history.len()
    }

    /// `(timestamp, equity)` pairs for the chart sink.
    pub fn equity_curve(&self) -> impl Iterator<Item = (Timestamp, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.equity_history.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equity_flat_is_capital() {
        let state = EngineState::new(1000.0);
        assert_eq!(state.position_state(), PositionState::Flat);
        assert_eq!(state.equity_at(55.0), 1000.0);
    }

    #[test]
    fn open_does_not_touch_capital() {
        let mut state = EngineState::new(1000.0);
        let pos = state.open(3, 100.0, 0.5);
        assert_eq!(pos.size, 5);
        assert_eq!(state.capital, 1000.0);
        assert_eq!(state.position_state(), PositionState::Long);
        assert_eq!(state.equity_at(110.0), 1050.0);
    }

    #[test]
    fn close_routes_profit_and_loss() {
        let mut state = EngineState::new(1000.0);
        state.open(0, 100.0, 1.0);
        let (_, change) = state.close(90.0).unwrap();
        assert_eq!(change, -100.0);
        assert_eq!(state.capital, 900.0);
        assert_eq!(state.total_realized_loss, -100.0);
        assert_eq!(state.total_realized_profit, 0.0);

        state.open(1, 90.0, 1.0);
        let (_, change) = state.close(90.0).unwrap();
        assert_eq!(change, 0.0);
        assert_eq!(state.total_realized_profit, 0.0);
        assert_eq!(state.capital, 900.0);
        assert!(state.position.is_none());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&RunOutcome::Stopped { bar_index: 4 }).unwrap();
        assert_eq!(json, r#"{"status":"stopped","bar_index":4}"#);
        let json = serde_json::to_string(&RunOutcome::Completed).unwrap();
        assert_eq!(json, r#"{"status":"completed"}"#);
    }

    #[test]
    fn close_when_flat_is_none() {
        let mut state = EngineState::new(1000.0);
        assert!(state.close(10.0).is_none());
        assert_eq!(state.capital, 1000.0);
    }
}
