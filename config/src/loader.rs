//! Loads a strategy config from YAML bytes, validating it and computing its
//! `config_hash`. Callers get back both the parsed value and the raw bytes,
//! since the raw bytes are what the decision snapshot records verbatim.

use crate::error::ConfigError;
use crate::hash::compute_config_hash;
use crate::schema::StrategyConfig;
use crate::validate::validate_config;
use quant_core::ids::ConfigHash;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub parsed: StrategyConfig,
    pub raw_yaml: Vec<u8>,
    pub config_hash: ConfigHash,
}

/// Parses and validates config bytes without computing the hash over the
/// raw bytes — used internally and by tests that only need the parsed
/// value. Most callers should use [`load_config`] instead.
pub fn load_config_bytes(bytes: &[u8]) -> Result<LoadedConfig, ConfigError> {
    let parsed: StrategyConfig = serde_yaml::from_slice(bytes)?;
    validate_config(&parsed).map_err(ConfigError::Validation)?;
    let config_hash = compute_config_hash(&parsed);
    Ok(LoadedConfig {
        parsed,
        raw_yaml: bytes.to_vec(),
        config_hash,
    })
}

pub fn load_config(bytes: impl AsRef<[u8]>) -> Result<LoadedConfig, ConfigError> {
    load_config_bytes(bytes.as_ref())
}
