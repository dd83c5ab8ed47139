//! Domain types for tradesim

pub mod position;
pub mod risk;
pub mod series;
pub mod trade;

pub use position::{position_size, OpenPosition, PositionState};
pub use risk::{RiskProfile, RiskProfileError};
pub use series::{PricePoint, PriceSeries, SeriesError, Timestamp};
pub use trade::{TradeKind, TradeRecord};
