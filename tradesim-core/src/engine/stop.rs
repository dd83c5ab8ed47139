//! Stop-loss handler: the side-effect seam invoked when the loss cap is breached.

use crate::domain::TradeRecord;

/// Boxed error returned by stop-loss handlers.
pub type StopLossSinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receives the full ledger, ending in the `stop_loss` row, exactly once per
/// stopped run. The run is terminated whether or not the handler succeeds.
pub trait StopLossHandler {
    fn on_stop_loss(&mut self, ledger: &[TradeRecord]) -> Result<(), StopLossSinkError>;
}

/// Discards the ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStopLoss;

impl StopLossHandler for NoopStopLoss {
    fn on_stop_loss(&mut self, _ledger: &[TradeRecord]) -> Result<(), StopLossSinkError> {
        Ok(())
    }
}

/// Keeps a copy of every ledger it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingStopLoss {
    pub persisted: Vec<Vec<TradeRecord>>,
}

impl RecordingStopLoss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.persisted.len()
    }
}

impl StopLossHandler for RecordingStopLoss {
    fn on_stop_loss(&mut self, ledger: &[TradeRecord]) -> Result<(), StopLossSinkError> {
        self.persisted.push(ledger.to_vec());
        Ok(())
    }
}
