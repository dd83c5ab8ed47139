//! Position state of the single traded asset.

use serde::{Deserialize, Serialize};

/// Holding state, as seen by signal providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    pub fn is_long(&self) -> bool {
        matches!(self, Self::Long)
    }
}

/// An open LONG position. Fixed from entry until exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_bar: usize,
    pub entry_price: f64,
    pub size: u64,
}

impl OpenPosition {
    /// Unrealized change at `price`: `size × (price − entry_price)`.
    pub fn unrealized_change(&self, price: f64) -> f64 {
        self.size as f64 * (price - self.entry_price)
    }
}

/// Unit count for an entry: `floor(capital × position_limit / price)`, never negative.
///
/// Callers must reject non-positive prices first.
pub fn position_size(capital: f64, position_limit: f64, price: f64) -> u64 {
    let units = (capital * position_limit / price).floor();
    if units.is_finite() && units > 0.0 {
        units as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrealized_change_long() {
        let pos = OpenPosition {
            entry_bar: 2,
            entry_price: 100.0,
            size: 10,
        };
        assert_eq!(pos.unrealized_change(120.0), 200.0);
        assert_eq!(pos.unrealized_change(90.0), -100.0);
        assert_eq!(pos.unrealized_change(100.0), 0.0);
    }

    #[test]
    fn size_floors() {
        assert_eq!(position_size(1000.0, 1.0, 100.0), 10);
        assert_eq!(position_size(1000.0, 0.5, 30.0), 16);
        assert_eq!(position_size(50.0, 1.0, 100.0), 0);
    }

    #[test]
    fn negative_capital_sizes_to_zero() {
        assert_eq!(position_size(-500.0, 1.0, 10.0), 0);
    }

    #[test]
    fn default_state_is_flat() {
        assert_eq!(PositionState::default(), PositionState::Flat);
        assert!(PositionState::Long.is_long());
    }
}
