//! Run configuration and the strategy registry.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradesim_core::domain::RiskProfileError;
use tradesim_core::signal::{MacdCrossover, SignalProvider, SmaCrossover};

use crate::metrics::DEFAULT_RISK_FREE_RATE;

/// Deterministic identifier for a run configuration (BLAKE3 hex digest).
pub type RunId = String;

/// Registry names accepted by `StrategyConfig::from_name`, canonical first.
pub const STRATEGY_NAMES: &[&str] = &["sma_crossover", "macd"];

/// Configuration errors. All are fatal and raised before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown strategy '{0}' (available: sma_crossover, macd)")]
    UnknownStrategy(String),

    #[error("invalid {strategy} parameters: {reason}")]
    InvalidParameters {
        strategy: &'static str,
        reason: String,
    },

    #[error("risk-free rate must be finite, got {0}")]
    RiskFreeRate(f64),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid risk profile: {0}")]
    RiskProfile(#[from] RiskProfileError),
}

// ─── Strategy registry ──────────────────────────────────────────────

/// Signal provider selection with its parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Dual simple moving average crossover.
    SmaCrossover {
        #[serde(default = "sma_short")]
        short_period: usize,
        #[serde(default = "sma_long")]
        long_period: usize,
    },

    /// MACD-style EMA crossover.
    Macd {
        #[serde(default = "macd_short")]
        short_period: usize,
        #[serde(default = "macd_long")]
        long_period: usize,
        #[serde(default = "macd_signal")]
        signal_period: usize,
    },
}

fn sma_short() -> usize {
    20
}
fn sma_long() -> usize {
    50
}
fn macd_short() -> usize {
    12
}
fn macd_long() -> usize {
    26
}
fn macd_signal() -> usize {
    9
}

impl StrategyConfig {
    /// Look a strategy up by registry name, with default parameters.
    ///
    /// Matching ignores ASCII case and surrounding whitespace. Accepts
    /// `sma_crossover`, `sma` and `simple moving average` for the SMA
    /// crossover and `macd` for the MACD crossover.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sma_crossover" | "sma" | "simple moving average" => Ok(Self::SmaCrossover {
                short_period: sma_short(),
                long_period: sma_long(),
            }),
            "macd" => Ok(Self::Macd {
                short_period: macd_short(),
                long_period: macd_long(),
                signal_period: macd_signal(),
            }),
            _ => Err(ConfigError::UnknownStrategy(name.to_string())),
        }
    }

    /// Canonical registry name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SmaCrossover { .. } => "sma_crossover",
            Self::Macd { .. } => "macd",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidParameters {
            strategy: self.name(),
            reason: reason.to_string(),
        };
        match *self {
            Self::SmaCrossover {
                short_period,
                long_period,
            } => {
                if short_period == 0 {
                    return Err(invalid("short_period must be >= 1"));
                }
                if long_period <= short_period {
                    return Err(invalid("long_period must be > short_period"));
                }
            }
            Self::Macd {
                short_period,
                long_period,
                signal_period,
            } => {
                if short_period == 0 {
                    return Err(invalid("short_period must be >= 1"));
                }
                if long_period <= short_period {
                    return Err(invalid("long_period must be > short_period"));
                }
                if signal_period == 0 {
                    return Err(invalid("signal_period must be >= 1"));
                }
            }
        }
        Ok(())
    }

    /// Validate and instantiate the signal provider.
    pub fn build(&self) -> Result<Box<dyn SignalProvider>, ConfigError> {
        self.validate()?;
        Ok(match *self {
            Self::SmaCrossover {
                short_period,
                long_period,
            } => Box::new(SmaCrossover::new(short_period, long_period)),
            Self::Macd {
                short_period,
                long_period,
                signal_period,
            } => Box::new(MacdCrossover::new(short_period, long_period, signal_period)),
        })
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::SmaCrossover {
            short_period: sma_short(),
            long_period: sma_long(),
        }
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmaCrossover {
                short_period,
                long_period,
            } => write!(f, "sma_crossover({short_period}, {long_period})"),
            Self::Macd {
                short_period,
                long_period,
                signal_period,
            } => write!(f, "macd({short_period}, {long_period}, {signal_period})"),
        }
    }
}

// ─── Simulation config ──────────────────────────────────────────────

fn default_stop_loss_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

/// Everything needed to reproduce one simulation run.
///
/// Loadable from TOML; the CLI builds the same struct from flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Asset identifier, e.g. `EURUSD=X`.
    pub symbol: String,

    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Price CSV with `Date` and `Close` columns.
    pub data_path: PathBuf,

    pub risk_profile_path: PathBuf,

    /// Where ledger, result and equity artifacts are written. None skips export.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Directory of the append-only stop-loss ledgers.
    #[serde(default = "default_stop_loss_dir")]
    pub stop_loss_dir: PathBuf,

    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

impl SimulationConfig {
    pub fn new(
        symbol: impl Into<String>,
        strategy: StrategyConfig,
        data_path: impl Into<PathBuf>,
        risk_profile_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            strategy,
            data_path: data_path.into(),
            risk_profile_path: risk_profile_path.into(),
            output_dir: None,
            stop_loss_dir: default_stop_loss_dir(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::RiskFreeRate(self.risk_free_rate));
        }
        Ok(())
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        let strategy = self.strategy.to_string();
        let data_path = self.data_path.to_string_lossy();
        let risk_profile_path = self.risk_profile_path.to_string_lossy();

        let mut hasher = blake3::Hasher::new();
        for part in [
            self.symbol.as_str(),
            strategy.as_str(),
            &*data_path,
            &*risk_profile_path,
        ] {
            hasher.update(part.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(&self.risk_free_rate.to_bits().to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }
}
