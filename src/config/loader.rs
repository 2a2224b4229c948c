//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{InteractConfig, SecretString};
use crate::config::validation::{validate_config, ValidationError};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "interact.toml";

/// Environment variable names for overrides.
pub const ENDPOINT_ENV_VAR: &str = "COUNTER_ENDPOINT";
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "COUNTER_CONTRACT_ADDRESS";
pub const CHAIN_ID_ENV_VAR: &str = "COUNTER_CHAIN_ID";
pub const PRIVATE_KEY_ENV_VAR: &str = "COUNTER_PRIVATE_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a configuration file.
pub fn load_config(path: &Path) -> Result<InteractConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Load the explicit file, else `interact.toml` if present, else defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<InteractConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                load_config(fallback)
            } else {
                tracing::debug!("No config file found, using defaults");
                Ok(InteractConfig::default())
            }
        }
    }
}

/// Apply `COUNTER_*` environment overrides using the given lookup.
pub fn apply_env_overrides<F>(config: &mut InteractConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = lookup(ENDPOINT_ENV_VAR) {
        config.network.endpoint = endpoint;
    }
    if let Some(address) = lookup(CONTRACT_ADDRESS_ENV_VAR) {
        config.contract.address = address;
    }
    if let Some(chain_id) = lookup(CHAIN_ID_ENV_VAR) {
        config.network.chain_id = chain_id.trim().parse().map_err(|e| ConfigError::Env {
            var: CHAIN_ID_ENV_VAR,
            message: format!("{}", e),
        })?;
    }
    // The key parser rejects whitespace, so env values are trimmed here.
    if let Some(key) = lookup(PRIVATE_KEY_ENV_VAR) {
        config.signer.private_key = Some(SecretString::new(key.trim()));
    }
    Ok(())
}

/// Run semantic validation, folding the errors into [`ConfigError`].
pub fn validate(config: &InteractConfig) -> Result<(), ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)
}
