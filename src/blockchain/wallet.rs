//! Signing identity for the write path.
//!
//! # Security
//! - The secret is parsed once and only the derived signer is kept
//! - Keys are never logged or serialized; `Debug` shows the address only

use std::fmt;

use alloy::hex;
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::client::ConnectionHandle;
use crate::blockchain::types::{InteractError, InteractResult};

/// Length of a secp256k1 secret scalar, hex encoded.
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Key material plus the chain and gas settings for one transaction.
///
/// Consumed by the write call it authorizes.
pub struct SigningIdentity {
    signer: PrivateKeySigner,
    chain_id: u64,
    gas_limit: u64,
    gas_price: Option<u128>,
}

impl SigningIdentity {
    /// Derive an identity from a hex-encoded secret.
    ///
    /// The secret must be exactly 64 hex characters without a `0x` prefix
    /// and must be a valid secp256k1 scalar. Whitespace anywhere is rejected.
    /// No network access happens here.
    pub fn from_private_key(secret: &str, chain_id: u64) -> InteractResult<Self> {
        if secret.chars().any(char::is_whitespace) {
            return Err(InteractError::KeyFormat(
                "private key must not contain whitespace".to_string(),
            ));
        }
        if secret.starts_with("0x") || secret.starts_with("0X") {
            return Err(InteractError::KeyFormat(
                "private key must not carry a 0x prefix".to_string(),
            ));
        }
        if secret.len() != PRIVATE_KEY_HEX_LEN {
            return Err(InteractError::KeyFormat(format!(
                "private key must be {} hex characters, got {}",
                PRIVATE_KEY_HEX_LEN,
                secret.len()
            )));
        }

        // Don't echo the decode error, it can quote key characters.
        let bytes = hex::decode(secret).map_err(|_| {
            InteractError::KeyFormat("private key is not valid hex".to_string())
        })?;
        let signer = PrivateKeySigner::from_slice(&bytes).map_err(|_| {
            InteractError::KeyFormat("private key is not a valid secp256k1 scalar".to_string())
        })?;

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Signing identity derived"
        );

        Ok(Self {
            signer,
            chain_id,
            gas_limit: 0,
            gas_price: None,
        })
    }

    pub fn set_gas_limit(&mut self, gas_limit: u64) {
        self.gas_limit = gas_limit;
    }

    pub fn set_gas_price(&mut self, gas_price: u128) {
        self.gas_price = Some(gas_price);
    }

    /// Ask the node for a gas price and store it.
    ///
    /// Fails with [`InteractError::GasEstimation`] when the query fails or
    /// the price exceeds `max_gas_price_gwei`. Never retried.
    pub async fn resolve_gas_price(
        &mut self,
        handle: &ConnectionHandle,
        max_gas_price_gwei: Option<u64>,
    ) -> InteractResult<u128> {
        let gas_price = handle
            .get_gas_price()
            .await
            .map_err(|e| InteractError::GasEstimation(e.to_string()))?;

        if let Some(max_gwei) = max_gas_price_gwei {
            if gas_price > u128::from(max_gwei) * WEI_PER_GWEI {
                return Err(InteractError::GasEstimation(format!(
                    "suggested gas price {} gwei exceeds maximum {} gwei",
                    gas_price / WEI_PER_GWEI,
                    max_gwei
                )));
            }
        }

        tracing::info!(gas_price_wei = gas_price, "Gas price resolved");
        self.gas_price = Some(gas_price);
        Ok(gas_price)
    }

    /// Gas limit and price, or an error if either is missing.
    pub fn ensure_ready(&self) -> InteractResult<(u64, u128)> {
        if self.gas_limit == 0 {
            return Err(InteractError::Submission("gas limit not set".to_string()));
        }
        match self.gas_price {
            Some(price) => Ok((self.gas_limit, price)),
            None => Err(InteractError::Submission("gas price not resolved".to_string())),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn gas_price(&self) -> Option<u128> {
        self.gas_price
    }

    /// Wallet used to sign transaction requests locally.
    pub(crate) fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.signer.address())
            .field("chain_id", &self.chain_id)
            .field("gas_limit", &self.gas_limit)
            .field("gas_price", &self.gas_price)
            .finish()
    }
}
