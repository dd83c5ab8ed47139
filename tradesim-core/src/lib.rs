//! Tradesim Core: single-asset trading simulation.
//!
//! This crate contains the simulation engine and everything it consumes:
//! - Domain types (price series, risk profile, position, trade ledger rows)
//! - Running indicators (SMA, EMA) updated once per bar
//! - The signal provider trait and its dual-SMA and MACD variants
//! - The per-bar engine loop with its loss-cap circuit breaker
//! - The stop-loss handler seam
//!
//! Nothing here performs I/O. Loading prices, persisting the stop-loss
//! ledger and computing statistics live in `tradesim-runner`.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signal;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: result and domain types can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::RiskProfile>();
        require_sync::<domain::RiskProfile>();
        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();
        require_send::<engine::RunResult>();
        require_sync::<engine::RunResult>();
        require_send::<engine::EngineError>();
        require_sync::<engine::EngineError>();

        require_send::<signal::SmaCrossover>();
        require_send::<signal::MacdCrossover>();
        require_send::<Box<dyn signal::SignalProvider>>();
    }
}
