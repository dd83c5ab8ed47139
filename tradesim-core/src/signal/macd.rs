//! MACD-style exponential moving average crossover.
//!
//! MACD line = long EMA − short EMA; signal line = EMA of the MACD line.
//! Both price EMAs run from bar 0. The MACD line is defined from bar
//! `long_period` onward, and the signal line is fed from that bar too, so
//! classifications start at bar `long_period + signal_period`.
//!
//! Bullish when MACD > signal and FLAT. Bearish when LONG and either
//! MACD > signal or the final bar is reached.

use super::{Signal, SignalProvider};
use crate::domain::{PositionState, PriceSeries};
use crate::indicators::RunningEma;

#[derive(Debug, Clone)]
pub struct MacdCrossover {
    pub short_period: usize,
    pub long_period: usize,
    pub signal_period: usize,
    short: RunningEma,
    long: RunningEma,
    signal: RunningEma,
    macd: Option<f64>,
}

impl MacdCrossover {
    pub fn new(short_period: usize, long_period: usize, signal_period: usize) -> Self {
        assert!(short_period >= 1, "short_period must be >= 1");
        assert!(
            long_period > short_period,
            "long_period must be > short_period"
        );
        assert!(signal_period >= 1, "signal_period must be >= 1");
        Self {
            short_period,
            long_period,
            signal_period,
            short: RunningEma::new(short_period),
            long: RunningEma::new(long_period),
            signal: RunningEma::new(signal_period),
            macd: None,
        }
    }

    pub fn default_params() -> Self {
        Self::new(12, 26, 9)
    }

    /// Latest MACD line value, once defined.
    pub fn macd(&self) -> Option<f64> {
        self.macd
    }

    /// Latest signal line value, once defined.
    pub fn signal_line(&self) -> Option<f64> {
        self.signal.value()
    }
}

impl SignalProvider for MacdCrossover {
    fn name(&self) -> &str {
        "macd"
    }

    fn label(&self) -> &str {
        "Moving Average CD"
    }

    fn warmup_bars(&self) -> usize {
        self.long_period + self.signal_period
    }

    fn update(&mut self, series: &PriceSeries, bar_index: usize) {
        let price = series.price(bar_index);
        let short = self.short.next(price);
        let long = self.long.next(price);

        if bar_index >= self.long_period {
            let macd = long - short;
            self.macd = Some(macd);
            self.signal.next(macd);
        }
    }

    fn classify(&self, series: &PriceSeries, bar_index: usize, position: PositionState) -> Signal {
        if bar_index < self.warmup_bars() {
            return Signal::Neutral;
        }
        let (Some(macd), Some(signal)) = (self.macd, self.signal.value()) else {
            return Signal::Neutral;
        };

        match position {
            PositionState::Flat if macd > signal => Signal::Bullish,
            PositionState::Long if macd > signal || bar_index == series.last_index() => {
                Signal::Bearish
            }
            _ => Signal::Neutral,
        }
    }
}
