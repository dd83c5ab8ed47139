//! PriceSeries: the ordered close-price input of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bar timestamp. All price sources normalize to UTC.
pub type Timestamp = DateTime<Utc>;

/// One bar of the input: a timestamp and its close price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: Timestamp,
    pub price: f64,
}

/// Errors raised while building a `PriceSeries`.
///
/// Length mismatch is a configuration error; the rest are data-quality errors.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("timestamp series has {timestamps} entries but price series has {prices}")]
    LengthMismatch { timestamps: usize, prices: usize },

    #[error("price series is empty")]
    Empty,

    #[error("price at bar {bar_index} is not finite ({price})")]
    NonFinitePrice { bar_index: usize, price: f64 },

    #[error("price at bar {bar_index} is negative ({price})")]
    NegativePrice { bar_index: usize, price: f64 },

    #[error("timestamp at bar {bar_index} ({timestamp}) does not follow the previous bar")]
    NonIncreasingTimestamp { bar_index: usize, timestamp: Timestamp },
}

/// Ordered, validated `(timestamp, price)` pairs indexed `0..n`.
///
/// Invariants enforced at construction: non-empty, every price finite and
/// non-negative, timestamps strictly increasing. The series is immutable
/// afterwards, so the engine and the signal providers can share it by reference.
/// Not `Deserialize`: the only way in is through validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    timestamps: Vec<Timestamp>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Build from two index-aligned sequences.
    pub fn from_parallel(timestamps: Vec<Timestamp>, prices: Vec<f64>) -> Result<Self, SeriesError> {
        if timestamps.len() != prices.len() {
            return Err(SeriesError::LengthMismatch {
                timestamps: timestamps.len(),
                prices: prices.len(),
            });
        }
        if prices.is_empty() {
            return Err(SeriesError::Empty);
        }

        for (i, &price) in prices.iter().enumerate() {
            if !price.is_finite() {
                return Err(SeriesError::NonFinitePrice { bar_index: i, price });
            }
            if price < 0.0 {
                return Err(SeriesError::NegativePrice { bar_index: i, price });
            }
        }

        for (i, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(SeriesError::NonIncreasingTimestamp {
                    bar_index: i + 1,
                    timestamp: pair[1],
                });
            }
        }

        Ok(Self { timestamps, prices })
    }

    /// Build from `(timestamp, price)` points.
    pub fn from_points(points: &[PricePoint]) -> Result<Self, SeriesError> {
        let timestamps = points.iter().map(|p| p.timestamp).collect();
        let prices = points.iter().map(|p| p.price).collect();
        Self::from_parallel(timestamps, prices)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Always false for a constructed series; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Index of the final bar.
    pub fn last_index(&self) -> usize {
        self.prices.len() - 1
    }

    pub fn price(&self, bar_index: usize) -> f64 {
        self.prices[bar_index]
    }

    pub fn timestamp(&self, bar_index: usize) -> Timestamp {
        self.timestamps[bar_index]
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn point(&self, bar_index: usize) -> PricePoint {
        PricePoint {
            timestamp: self.timestamps[bar_index],
            price: self.prices[bar_index],
        }
    }
}

/// Daily timestamps starting 2024-01-02, one per price. Test helper.
#[cfg(test)]
pub fn daily_series(prices: &[f64]) -> PriceSeries {
    use chrono::TimeZone;
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let timestamps = (0..prices.len())
        .map(|i| base + chrono::Duration::days(i as i64))
        .collect();
    PriceSeries::from_parallel(timestamps, prices.to_vec()).unwrap()
}
