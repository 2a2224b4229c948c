//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkConfig
//!     → client.rs (connection handle, per-request timeouts)
//!     → contract.rs (counter binding: getCount / increment)
//!     → wallet.rs (signing identity, gas limit and price)
//!     → transaction.rs (sign, broadcast, wait for receipt)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or endpoint paths (they often carry API keys)
//! - All RPC calls have configurable timeouts
//! - The write path is never retried

pub mod client;
pub mod contract;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{ConnectionHandle, RpcFailure};
pub use contract::CounterBinding;
pub use transaction::{submit_call, ConfirmationWaiter};
pub use types::{
    ChainId, ConfirmationReceipt, CounterValue, InteractError, InteractResult, TransactionRecord,
};
pub use wallet::SigningIdentity;
