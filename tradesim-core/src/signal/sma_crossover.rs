//! Dual simple-moving-average crossover.
//!
//! Bullish while the short SMA sits above the long SMA and the engine is FLAT.
//! Bearish once LONG and the short SMA drops below the long SMA, or on the
//! final bar of the series so no position is left open.

use super::{Signal, SignalProvider};
use crate::domain::{PositionState, PriceSeries};
use crate::indicators::RunningSma;

#[derive(Debug, Clone)]
pub struct SmaCrossover {
    pub short_period: usize,
    pub long_period: usize,
    short: RunningSma,
    long: RunningSma,
}

impl SmaCrossover {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        assert!(short_period >= 1, "short_period must be >= 1");
        assert!(
            long_period > short_period,
            "long_period must be > short_period"
        );
        Self {
            short_period,
            long_period,
            short: RunningSma::new(short_period),
            long: RunningSma::new(long_period),
        }
    }

    pub fn default_params() -> Self {
        Self::new(20, 50)
    }

    /// Current (short, long) averages.
    pub fn averages(&self) -> (f64, f64) {
        (self.short.value(), self.long.value())
    }
}

impl SignalProvider for SmaCrossover {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn label(&self) -> &str {
        "Simple Moving Average"
    }

    fn warmup_bars(&self) -> usize {
        self.long_period
    }

    fn update(&mut self, series: &PriceSeries, bar_index: usize) {
        let price = series.price(bar_index);
        self.short.next(price);
        self.long.next(price);
    }

    fn classify(&self, series: &PriceSeries, bar_index: usize, position: PositionState) -> Signal {
        if bar_index < self.warmup_bars() {
            return Signal::Neutral;
        }

        let (short, long) = self.averages();
        match position {
            PositionState::Flat if short > long => Signal::Bullish,
            PositionState::Long if short < long || bar_index == series.last_index() => {
                Signal::Bearish
            }
            _ => Signal::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::daily_series;

    fn drive(sig: &mut SmaCrossover, series: &PriceSeries, upto: usize) {
        for i in 0..=upto {
            sig.update(series, i);
        }
    }

    #[test]
    fn neutral_during_warmup() {
        let prices: Vec<f64> = (1..=10).map(f64::from).collect();
        let series = daily_series(&prices);
        let mut sig = SmaCrossover::new(2, 5);
        for i in 0..5 {
            sig.update(&series, i);
            assert_eq!(sig.classify(&series, i, PositionState::Flat), Signal::Neutral);
        }
    }

    #[test]
    fn bullish_on_rising_prices_when_flat() {
        let prices: Vec<f64> = (1..=10).map(f64::from).collect();
        let series = daily_series(&prices);
        let mut sig = SmaCrossover::new(2, 5);
        drive(&mut sig, &series, 6);
        // short = (6+7)/2 = 6.5, long = (3+4+5+6+7)/5 = 5
        let (short, long) = sig.averages();
        assert_eq!(short, 6.5);
        assert_eq!(long, 5.0);
        assert_eq!(sig.classify(&series, 6, PositionState::Flat), Signal::Bullish);
        // Already long and short still above long: hold.
        assert_eq!(sig.classify(&series, 6, PositionState::Long), Signal::Neutral);
    }

    #[test]
    fn bearish_on_falling_prices_when_long() {
        let prices: Vec<f64> = (1..=10).rev().map(f64::from).collect();
        let series = daily_series(&prices);
        let mut sig = SmaCrossover::new(2, 5);
        drive(&mut sig, &series, 6);
        assert_eq!(sig.classify(&series, 6, PositionState::Long), Signal::Bearish);
        assert_eq!(sig.classify(&series, 6, PositionState::Flat), Signal::Neutral);
    }

    #[test]
    fn forced_exit_on_last_bar() {
        let prices: Vec<f64> = (1..=8).map(f64::from).collect();
        let series = daily_series(&prices);
        let mut sig = SmaCrossover::new(2, 5);
        drive(&mut sig, &series, 7);
        assert_eq!(sig.classify(&series, 7, PositionState::Long), Signal::Bearish);
    }

    #[test]
    fn constant_series_never_signals_entry() {
        let series = daily_series(&[50.0; 40]);
        let mut sig = SmaCrossover::new(3, 10);
        for i in 0..series.len() {
            sig.update(&series, i);
            assert_eq!(sig.classify(&series, i, PositionState::Flat), Signal::Neutral);
        }
    }

    #[test]
    #[should_panic(expected = "long_period must be > short_period")]
    fn rejects_inverted_periods() {
        SmaCrossover::new(10, 5);
    }

    #[test]
    fn default_params() {
        let sig = SmaCrossover::default_params();
        assert_eq!((sig.short_period, sig.long_period), (20, 50));
        assert_eq!(sig.warmup_bars(), 50);
    }
}
