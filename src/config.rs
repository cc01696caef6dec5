use std::path::Path;
use thiserror::Error;

use threadcore::ListConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads a JSON list configuration. Missing fields take their defaults.
pub fn load(path: &Path) -> Result<ListConfig, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    Ok(ListConfig::from_json(&json)?)
}
