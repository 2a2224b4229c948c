//! Typed client for a deployed counter contract.
//!
//! Connects to a JSON-RPC node, reads the counter, signs and submits
//! `increment()`, and waits for the receipt.

pub mod blockchain;
pub mod config;
pub mod flow;
pub mod lifecycle;
pub mod observability;

pub use blockchain::{ConnectionHandle, CounterBinding, InteractError, SigningIdentity};
pub use config::InteractConfig;
pub use flow::{run_increment, run_read, FlowError, IncrementReport, Step};
pub use lifecycle::Shutdown;
