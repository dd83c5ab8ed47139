//! Signal providers: per-bar bullish/bearish/neutral classification.
//!
//! The engine drives a provider through two calls per bar, in order:
//! `update(bar_index)` to refresh its incremental indicator state, then
//! `classify(bar_index, position)` to read the bar's classification.
//! Providers see the current position state so they can gate entries on
//! being FLAT and force an exit on the final bar.

pub mod macd;
pub mod scripted;
pub mod sma_crossover;

use crate::domain::{PositionState, PriceSeries};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Open a LONG position if FLAT.
    Bullish,
    /// Close the LONG position if LONG.
    Bearish,
    #[default]
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "none",
        })
    }
}

/// Trait for signal providers.
///
/// `update` is called exactly once per processed bar, in increasing bar order,
/// and must only read `series` up to and including `bar_index`.
pub trait SignalProvider: Send {
    /// Registry name (e.g., "sma_crossover").
    fn name(&self) -> &str;

    /// Human-readable strategy label used in chart titles and sink file names.
    fn label(&self) -> &str;

    /// Number of bars before this provider can classify anything but neutral.
    fn warmup_bars(&self) -> usize;

    /// Refresh indicator state with bar `bar_index`.
    fn update(&mut self, series: &PriceSeries, bar_index: usize);

    /// Classify bar `bar_index` given the engine's current position state.
    fn classify(&self, series: &PriceSeries, bar_index: usize, position: PositionState) -> Signal;
}

/// Always neutral. Used where no trading should occur.
pub struct NullSignal;

impl SignalProvider for NullSignal {
    fn name(&self) -> &str {
        "null"
    }

    fn label(&self) -> &str {
        "Null"
    }

    fn warmup_bars(&self) -> usize {
        0
    }

    fn update(&mut self, _series: &PriceSeries, _bar_index: usize) {}

    fn classify(&self, _series: &PriceSeries, _bar_index: usize, _position: PositionState) -> Signal {
        Signal::Neutral
    }
}

pub use macd::MacdCrossover;
pub use scripted::ScriptedSignal;
pub use sma_crossover::SmaCrossover;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::daily_series;

    #[test]
    fn null_signal_is_always_neutral() {
        let series = daily_series(&[1.0, 2.0, 3.0]);
        let mut sig = NullSignal;
        for i in 0..series.len() {
            sig.update(&series, i);
            assert_eq!(sig.classify(&series, i, PositionState::Flat), Signal::Neutral);
            assert_eq!(sig.classify(&series, i, PositionState::Long), Signal::Neutral);
        }
        assert_eq!(sig.name(), "null");
        assert_eq!(sig.warmup_bars(), 0);
    }

    #[test]
    fn signal_display_matches_ledger_vocabulary() {
        assert_eq!(Signal::Bullish.to_string(), "bullish");
        assert_eq!(Signal::Bearish.to_string(), "bearish");
        assert_eq!(Signal::Neutral.to_string(), "none");
    }
}
