//! Running (one-update-per-bar) indicators used by the signal providers.
//!
//! Both indicators consume one value per bar and keep O(1) state per update,
//! so a full run is linear in the series length.

pub mod ema;
pub mod sma;

pub use ema::RunningEma;
pub use sma::RunningSma;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
