//! Chain-specific types and error definitions.

use std::fmt;

use alloy::primitives::{Address, TxHash, B256, U256};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while talking to the node or the counter contract.
#[derive(Debug, Error)]
pub enum InteractError {
    /// Endpoint malformed or unreachable.
    #[error("connection error: {0}")]
    Connection(String),

    /// The node serves a different chain than the one we sign for.
    #[error("chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Contract address is not a well-formed 20-byte value.
    #[error("binding error: {0}")]
    Binding(String),

    /// Read-only call failed, reverted or could not be decoded.
    #[error("query error: {0}")]
    Query(String),

    /// Private key is not 64 hex characters or not a valid scalar.
    #[error("key format error: {0}")]
    KeyFormat(String),

    /// Gas price suggestion could not be obtained or was rejected.
    #[error("gas estimation error: {0}")]
    GasEstimation(String),

    /// Signing or broadcasting the transaction failed.
    #[error("submission error: {0}")]
    Submission(String),

    /// Transaction was not mined before the deadline.
    #[error("transaction {tx_hash} not confirmed within {waited_ms} ms")]
    ConfirmationTimeout { tx_hash: TxHash, waited_ms: u128 },

    /// Transaction was mined but execution failed.
    #[error("transaction {tx_hash} failed: {reason}")]
    Confirmation { tx_hash: TxHash, reason: String },

    /// The wait was abandoned through the cancellation signal.
    #[error("wait for transaction {tx_hash} cancelled")]
    Cancelled { tx_hash: TxHash },
}

/// Result type for contract interaction.
pub type InteractResult<T> = Result<T, InteractError>;

/// Snapshot of the contract's counter.
///
/// Serializes as a decimal string, matching the plain-text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CounterValue(U256);

impl CounterValue {
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn get(&self) -> U256 {
        self.0
    }
}

impl From<U256> for CounterValue {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for CounterValue {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl fmt::Display for CounterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for CounterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// A transaction accepted into the node's pending pool.
///
/// Only the write path can build one, so a waiter is never handed a hash
/// that did not come from a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    hash: TxHash,
    from: Address,
    to: Address,
    nonce: u64,
    gas_limit: u64,
    gas_price: u128,
}

impl TransactionRecord {
    pub(crate) fn new(
        hash: TxHash,
        from: Address,
        to: Address,
        nonce: u64,
        gas_limit: u64,
        gas_price: u128,
    ) -> Self {
        Self {
            hash,
            from,
            to,
            nonce,
            gas_limit,
            gas_price,
        }
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn sender(&self) -> Address {
        self.from
    }

    pub fn to(&self) -> Address {
        self.to
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn gas_price(&self) -> u128 {
        self.gas_price
    }
}

/// Block inclusion info for a successfully mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub block_hash: Option<B256>,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    /// Blocks on top of and including the inclusion block.
    pub confirmations: u64,
}
