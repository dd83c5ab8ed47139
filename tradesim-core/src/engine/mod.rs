//! Simulation engine: the per-bar state machine.
//!
//! Each bar runs six steps in a fixed order:
//!
//! 1. Stop check: a breached loss cap appends a `stop_loss` row, hands the
//!    ledger to the stop-loss handler and ends the run before anything else
//!    happens on the bar.
//! 2. Equity accounting: mark-to-market equity and the period return.
//! 3. Signal update.
//! 4. Signal classification.
//! 5. Entry transition (bullish while FLAT).
//! 6. Exit transition (bearish while LONG).

pub mod error;
pub mod loop_runner;
pub mod state;
pub mod stop;

pub use error::EngineError;
pub use loop_runner::Engine;
pub use state::{EngineState, RunOutcome, RunResult};
pub use stop::{NoopStopLoss, RecordingStopLoss, StopLossHandler, StopLossSinkError};
