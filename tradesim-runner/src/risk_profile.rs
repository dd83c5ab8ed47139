//! Risk profile loading.
//!
//! Profiles are JSON (`{"initial_capital": .., "position_limit": .., "loss_cap": ..}`)
//! or TOML with the same keys. The format is chosen by file extension; any
//! extension other than `.toml` is read as JSON.

use std::fs;
use std::path::Path;

use tracing::debug;
use tradesim_core::domain::RiskProfile;

use crate::config::ConfigError;

/// Read, parse and validate a risk profile file.
pub fn load_risk_profile(path: &Path) -> Result<RiskProfile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let profile = if is_toml {
        parse_toml(&text)
    } else {
        parse_json(&text)
    }
    .map_err(|reason| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    })?;

    profile.validate()?;
    debug!(
        path = %path.display(),
        initial_capital = profile.initial_capital,
        position_limit = profile.position_limit,
        loss_cap = profile.loss_cap,
        "loaded risk profile"
    );
    Ok(profile)
}

fn parse_json(text: &str) -> Result<RiskProfile, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn parse_toml(text: &str) -> Result<RiskProfile, String> {
    toml::from_str(text).map_err(|e| e.to_string())
}
