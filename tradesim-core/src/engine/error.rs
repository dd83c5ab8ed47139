//! Engine errors.

use crate::domain::{RiskProfileError, SeriesError};
use thiserror::Error;

/// Errors that abort a run.
///
/// Series and risk-profile errors are configuration errors raised before the
/// loop starts; the rest are data-quality errors raised mid-run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid price series: {0}")]
    Series(#[from] SeriesError),

    #[error("invalid risk profile: {0}")]
    RiskProfile(#[from] RiskProfileError),

    #[error("equity at bar {bar_index} is not finite ({equity})")]
    NonFiniteEquity { bar_index: usize, equity: f64 },

    #[error("cannot open a position at non-positive price {price} on bar {bar_index}")]
    NonPositiveEntryPrice { bar_index: usize, price: f64 },

    #[error("stop-loss sink failed: {0}")]
    StopLossSink(String),
}
