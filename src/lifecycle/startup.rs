//! Startup configuration assembly.
//!
//! # Responsibilities
//! - Load the config file (or defaults)
//! - Layer environment and command-line overrides on top
//! - Validate the result before anything touches the network
//!
//! # Design Decisions
//! - Precedence: file < environment < command line
//! - Fail fast: any startup error is fatal

use std::path::Path;

use crate::config::loader::{apply_env_overrides, load_or_default, validate};
use crate::config::{ConfigError, InteractConfig};

/// Values supplied on the command line; `None` leaves the setting alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub contract_address: Option<String>,
    pub chain_id: Option<u64>,
    pub gas_limit: Option<u64>,
    pub confirmation_timeout_secs: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, config: &mut InteractConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.network.endpoint = endpoint.clone();
        }
        if let Some(address) = &self.contract_address {
            config.contract.address = address.clone();
        }
        if let Some(chain_id) = self.chain_id {
            config.network.chain_id = chain_id;
        }
        if let Some(gas_limit) = self.gas_limit {
            config.transaction.gas_limit = gas_limit;
        }
        if let Some(secs) = self.confirmation_timeout_secs {
            config.transaction.confirmation_timeout_secs = secs;
        }
    }
}

/// Build the validated configuration for one run.
pub fn resolve_config<F>(
    path: Option<&Path>,
    env: F,
    overrides: &Overrides,
) -> Result<InteractConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = load_or_default(path)?;
    apply_env_overrides(&mut config, env)?;
    overrides.apply(&mut config);
    validate(&config)?;
    Ok(config)
}
