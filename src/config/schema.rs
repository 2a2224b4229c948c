//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tool.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Root configuration for a counter interaction run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InteractConfig {
    /// Node endpoint settings.
    pub network: NetworkConfig,

    /// Deployed counter contract.
    pub contract: ContractConfig,

    /// Signing key material.
    pub signer: SignerConfig,

    /// Gas and confirmation settings for the write path.
    pub transaction: TransactionConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Node endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub endpoint: String,

    /// Chain ID (11155111 for Sepolia, 31337 for local Anvil).
    pub chain_id: u64,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8545".to_string(),
            chain_id: 11_155_111,
            rpc_timeout_secs: 10,
        }
    }
}

impl NetworkConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

/// Counter contract location.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// Hex address, with or without `0x`.
    pub address: String,
}

/// Signer configuration.
///
/// Prefer supplying the key through `COUNTER_PRIVATE_KEY` instead of the
/// config file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SignerConfig {
    /// 64 hex characters, no `0x` prefix.
    pub private_key: Option<SecretString>,
}

/// Write path configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Upper bound on gas units for the increment call.
    pub gas_limit: u64,

    /// Refuse to sign when the suggested price exceeds this (gwei).
    pub max_gas_price_gwei: Option<u64>,

    /// Default deadline for the confirmation wait.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Blocks required including the inclusion block.
    pub required_confirmations: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_limit: 300_000,
            max_gas_price_gwei: None,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 1_000,
            required_confirmations: 1,
        }
    }
}

impl TransactionConfig {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// `pretty` or `json`.
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

/// A string that never shows up in logs, debug output or serialized config.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}
