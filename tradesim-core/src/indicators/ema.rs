//! Exponential Moving Average, maintained as running state.
//!
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: the first value fed.
//!
//! This is the fixed-alpha form over the whole history. It is not the
//! windowed recursion `EMA(p, i) = x[i]·α_p + EMA(p−1, i−1)·(1−α_p)`, whose
//! alpha changes with each level and which only reaches back `p − 1` bars;
//! the two agree on constant input and diverge otherwise.

#[derive(Debug, Clone)]
pub struct RunningEma {
    period: usize,
    alpha: f64,
    value: Option<f64>,
}

impl RunningEma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            value: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Feed the next value and return the updated average.
    pub fn next(&mut self, x: f64) -> f64 {
        let ema = match self.value {
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
            None => x,
        };
        self.value = Some(ema);
        ema
    }

    /// None until the first value has been fed.
    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    /// Fixed-alpha recursion: EMA(0) = x[0], EMA(i) = x[i]·α + EMA(i-1)·(1-α).
    fn ema_recursive(values: &[f64], alpha: f64, i: usize) -> f64 {
        if i == 0 {
            return values[0];
        }
        values[i] * alpha + ema_recursive(values, alpha, i - 1) * (1.0 - alpha)
    }

    /// Windowed recursion with a per-level alpha, unrolled from p = 1 upward.
    /// Needs `i + 1 >= period`.
    fn ema_windowed(values: &[f64], period: usize, i: usize) -> f64 {
        let start = i + 1 - period;
        let mut ema = values[start];
        for level in 2..=period {
            let alpha = 2.0 / (level as f64 + 1.0);
            ema = values[start + level - 1] * alpha + ema * (1.0 - alpha);
        }
        ema
    }

    #[test]
    fn ema_period_1_equals_input() {
        let mut ema = RunningEma::new(1);
        assert_approx(ema.next(100.0), 100.0, DEFAULT_EPSILON);
        assert_approx(ema.next(200.0), 200.0, DEFAULT_EPSILON);
        assert_approx(ema.next(300.0), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 2/(3+1) = 0.5
        // EMA[0] = 10, EMA[1] = 0.5*11 + 0.5*10 = 10.5, EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        let mut ema = RunningEma::new(3);
        assert_eq!(ema.value(), None);
        assert_approx(ema.next(10.0), 10.0, DEFAULT_EPSILON);
        assert_approx(ema.next(11.0), 10.5, DEFAULT_EPSILON);
        assert_approx(ema.next(12.0), 11.25, DEFAULT_EPSILON);
        assert_eq!(ema.value(), Some(11.25));
    }

    #[test]
    fn running_matches_fixed_alpha_recursion() {
        let values = [1.0, 3.0, 2.0, 5.0, 4.0, 8.0, 7.0, 6.0, 9.0, 10.0, 4.5, 3.25];
        for period in [1, 2, 3, 5, 9] {
            let mut ema = RunningEma::new(period);
            for (i, &v) in values.iter().enumerate() {
                let running = ema.next(v);
                let recursive = ema_recursive(&values, ema.alpha(), i);
                assert_approx(running, recursive, 1e-12);
            }
        }
    }

    #[test]
    fn running_departs_from_windowed_recursion() {
        let values = [1.0, 3.0, 2.0, 5.0, 4.0, 8.0, 7.0, 6.0, 9.0, 10.0];
        let mut ema = RunningEma::new(3);
        let running: Vec<f64> = values.iter().map(|&v| ema.next(v)).collect();

        // Windowed p=3: x[i]/2 + x[i-1]/3 + x[i-2]/6.
        assert_approx(ema_windowed(&values, 3, 2), 2.0 + 1.0 / 6.0, 1e-12);
        assert_approx(running[2], 2.0, DEFAULT_EPSILON);
        assert_approx(ema_windowed(&values, 3, 9), 9.0, 1e-12);
        assert_approx(running[9], 8.8046875, DEFAULT_EPSILON);

        let max_gap = (2..values.len())
            .map(|i| (running[i] - ema_windowed(&values, 3, i)).abs())
            .fold(0.0_f64, f64::max);
        assert!(max_gap > 0.4, "gap {max_gap}");
    }

    #[test]
    fn running_and_windowed_agree_on_constant_input() {
        let values = [7.5; 30];
        let mut ema = RunningEma::new(9);
        for (i, &v) in values.iter().enumerate() {
            let running = ema.next(v);
            if i >= 8 {
                assert_approx(running, ema_windowed(&values, 9, i), 1e-12);
            }
        }
    }

    #[test]
    fn constant_input_is_fixed_point() {
        let mut ema = RunningEma::new(26);
        for _ in 0..100 {
            assert_approx(ema.next(42.0), 42.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    #[should_panic(expected = "EMA period must be >= 1")]
    fn rejects_zero_period() {
        RunningEma::new(0);
    }
}
