//! Scripted signal: replays a fixed bar → classification table.
//!
//! Useful for replaying externally generated signals and for exercising the
//! engine with known transition points.

use std::collections::BTreeMap;

use super::{Signal, SignalProvider};
use crate::domain::{PositionState, PriceSeries};

#[derive(Debug, Clone, Default)]
pub struct ScriptedSignal {
    script: BTreeMap<usize, Signal>,
    updates: usize,
}

impl ScriptedSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `signal` at `bar_index`.
    pub fn at(mut self, bar_index: usize, signal: Signal) -> Self {
        self.script.insert(bar_index, signal);
        self
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, Signal)>) -> Self {
        Self {
            script: pairs.into_iter().collect(),
            updates: 0,
        }
    }

    /// Number of `update` calls received so far.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl SignalProvider for ScriptedSignal {
    fn name(&self) -> &str {
        "scripted"
    }

    fn label(&self) -> &str {
        "Scripted"
    }

    fn warmup_bars(&self) -> usize {
        0
    }

    fn update(&mut self, _series: &PriceSeries, _bar_index: usize) {
        self.updates += 1;
    }

    fn classify(&self, _series: &PriceSeries, bar_index: usize, _position: PositionState) -> Signal {
        self.script.get(&bar_index).copied().unwrap_or_default()
    }
}
