//! Simple Moving Average, maintained incrementally.
//!
//! A running window sum is updated add-newest, subtract-oldest, and the
//! average is always `sum / period`. Before the window fills, the average is
//! therefore the partial sum divided by the full period, which under-weights
//! the first `period - 1` bars.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RunningSma {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl RunningSma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed the next value and return the updated average.
    pub fn next(&mut self, x: f64) -> f64 {
        self.window.push_back(x);
        self.sum += x;
        if self.window.len() > self.period {
            if let Some(leaving) = self.window.pop_front() {
                self.sum -= leaving;
            }
        }
        self.value()
    }

    pub fn value(&self) -> f64 {
        self.sum / self.period as f64
    }

    /// True once `period` values have been fed.
    pub fn is_full(&self) -> bool {
        self.window.len() >= self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let mut sma = RunningSma::new(5);
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let out: Vec<f64> = closes.iter().map(|&c| sma.next(c)).collect();

        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(out[4], 12.0, DEFAULT_EPSILON);
        // SMA[5] = mean(11,12,13,14,15) = 13.0
        assert_approx(out[5], 13.0, DEFAULT_EPSILON);
        assert_approx(out[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn partial_window_divides_by_full_period() {
        let mut sma = RunningSma::new(4);
        assert_approx(sma.next(8.0), 2.0, DEFAULT_EPSILON);
        assert_approx(sma.next(8.0), 4.0, DEFAULT_EPSILON);
        assert!(!sma.is_full());
        assert_approx(sma.next(8.0), 6.0, DEFAULT_EPSILON);
        assert_approx(sma.next(8.0), 8.0, DEFAULT_EPSILON);
        assert!(sma.is_full());
    }

    #[test]
    fn sma_1_is_close() {
        let mut sma = RunningSma::new(1);
        assert_approx(sma.next(100.0), 100.0, DEFAULT_EPSILON);
        assert_approx(sma.next(200.0), 200.0, DEFAULT_EPSILON);
        assert_approx(sma.next(300.0), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn matches_full_window_mean_on_long_series() {
        let closes: Vec<f64> = (0..500).map(|i| 100.0 + (i as f64 * 0.37).sin() * 5.0).collect();
        let mut sma = RunningSma::new(20);
        for (i, &c) in closes.iter().enumerate() {
            let v = sma.next(c);
            if i >= 19 {
                let naive: f64 = closes[i + 1 - 20..=i].iter().sum::<f64>() / 20.0;
                assert_approx(v, naive, 1e-9);
            }
        }
    }

    #[test]
    #[should_panic(expected = "SMA period must be >= 1")]
    fn rejects_zero_period() {
        RunningSma::new(0);
    }
}
