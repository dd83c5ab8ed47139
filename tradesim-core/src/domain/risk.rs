//! RiskProfile: capital, sizing fraction and loss cap for one run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RiskProfileError {
    #[error("initial_capital must be a positive finite number, got {0}")]
    InitialCapital(f64),

    #[error("position_limit must be in (0, 1], got {0}")]
    PositionLimit(f64),

    #[error("loss_cap must be in (0, 1], got {0}")]
    LossCap(f64),
}

/// Immutable risk parameters for a run.
///
/// Field names match the JSON risk-management profile files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub initial_capital: f64,
    /// Fraction of current capital committed (notionally) per entry.
    pub position_limit: f64,
    /// Fraction of initial capital the cumulative realized loss may reach.
    pub loss_cap: f64,
}

impl RiskProfile {
    /// Construct and validate.
    pub fn new(initial_capital: f64, position_limit: f64, loss_cap: f64) -> Result<Self, RiskProfileError> {
        let profile = Self {
            initial_capital,
            position_limit,
            loss_cap,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), RiskProfileError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(RiskProfileError::InitialCapital(self.initial_capital));
        }
        if !in_unit_interval(self.position_limit) {
            return Err(RiskProfileError::PositionLimit(self.position_limit));
        }
        if !in_unit_interval(self.loss_cap) {
            return Err(RiskProfileError::LossCap(self.loss_cap));
        }
        Ok(())
    }

    /// Magnitude of cumulative realized loss beyond which the run stops.
    pub fn loss_threshold(&self) -> f64 {
        self.initial_capital * self.loss_cap
    }
}

fn in_unit_interval(x: f64) -> bool {
    x > 0.0 && x <= 1.0
}
