//! TradeRecord: one append-only row of the run's trade ledger.

use super::series::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened on the ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    /// A LONG position was opened.
    Entry,
    /// The LONG position was closed and its change realized.
    Exit,
    /// The loss cap was breached and the run terminated.
    StopLoss,
}

impl TradeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::StopLoss => "stop_loss",
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ledger row. Never mutated after it is appended.
///
/// `realized_change` is `None` on entries, the realized PnL of the round trip
/// on exits, and the cumulative realized loss on a stop-loss row. Stop-loss
/// rows carry the bar's price and a size of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: Timestamp,
    pub kind: TradeKind,
    pub price: f64,
    pub size: u64,
    pub realized_change: Option<f64>,
    pub bar_index: usize,
}

impl TradeRecord {
    pub fn entry(timestamp: Timestamp, bar_index: usize, price: f64, size: u64) -> Self {
        Self {
            timestamp,
            kind: TradeKind::Entry,
            price,
            size,
            realized_change: None,
            bar_index,
        }
    }

    pub fn exit(
        timestamp: Timestamp,
        bar_index: usize,
        price: f64,
        size: u64,
        realized_change: f64,
    ) -> Self {
        Self {
            timestamp,
            kind: TradeKind::Exit,
            price,
            size,
            realized_change: Some(realized_change),
            bar_index,
        }
    }

    pub fn stop_loss(timestamp: Timestamp, bar_index: usize, price: f64, cumulative_loss: f64) -> Self {
        Self {
            timestamp,
            kind: TradeKind::StopLoss,
            price,
            size: 0,
            realized_change: Some(cumulative_loss),
            bar_index,
        }
    }

    /// Exit rows with a strictly positive realized change.
    pub fn is_winning_exit(&self) -> bool {
        self.kind == TradeKind::Exit && self.realized_change.is_some_and(|c| c > 0.0)
    }
}
