//! End-to-end counter interaction.
//!
//! # Data Flow
//! ```text
//! connect → bind → read (before) → sign → submit → confirm → read (after)
//! ```
//!
//! Every step is attempted once. The first failure ends the run and is
//! reported with the step it happened in.

use std::fmt;

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use thiserror::Error;

use crate::blockchain::{
    ConfirmationReceipt, ConfirmationWaiter, ConnectionHandle, CounterBinding, CounterValue,
    InteractError, SigningIdentity,
};
use crate::config::InteractConfig;
use crate::lifecycle::Shutdown;

/// Pipeline stage, used to tell the user where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Connect,
    Bind,
    ReadBefore,
    Sign,
    Submit,
    Confirm,
    ReadAfter,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Connect => "connect",
            Step::Bind => "bind",
            Step::ReadBefore => "read (before)",
            Step::Sign => "sign",
            Step::Submit => "submit",
            Step::Confirm => "confirm",
            Step::ReadAfter => "read (after)",
        };
        f.write_str(name)
    }
}

/// A failed run: which step, and why.
#[derive(Debug, Error)]
#[error("step `{step}` failed: {source}")]
pub struct FlowError {
    pub step: Step,
    #[source]
    pub source: InteractError,
}

impl FlowError {
    fn at(step: Step) -> impl FnOnce(InteractError) -> FlowError {
        move |source| FlowError { step, source }
    }
}

/// Outcome of a successful increment run.
#[derive(Debug, Clone, Serialize)]
pub struct IncrementReport {
    pub contract: Address,
    pub before: CounterValue,
    pub tx_hash: TxHash,
    pub receipt: ConfirmationReceipt,
    pub after: CounterValue,
}

/// Connect, bind and read the counter once.
pub async fn run_read(config: &InteractConfig) -> Result<CounterValue, FlowError> {
    let handle = ConnectionHandle::connect(&config.network)
        .await
        .map_err(FlowError::at(Step::Connect))?;
    let counter = CounterBinding::new(&config.contract.address, &handle)
        .map_err(FlowError::at(Step::Bind))?;

    let value = counter
        .read_count()
        .await
        .map_err(FlowError::at(Step::ReadBefore))?;
    tracing::info!(contract = %counter.address(), count = %value, "Counter read");
    Ok(value)
}

/// Read, increment, wait for the receipt, read again.
///
/// `shutdown` abandons the confirmation wait; earlier steps are not
/// interrupted.
pub async fn run_increment(
    config: &InteractConfig,
    shutdown: &Shutdown,
) -> Result<IncrementReport, FlowError> {
    let handle = ConnectionHandle::connect(&config.network)
        .await
        .map_err(FlowError::at(Step::Connect))?;
    let counter = CounterBinding::new(&config.contract.address, &handle)
        .map_err(FlowError::at(Step::Bind))?;

    let before = counter
        .read_count()
        .await
        .map_err(FlowError::at(Step::ReadBefore))?;
    tracing::info!(contract = %counter.address(), count = %before, "Counter before increment");

    let identity = prepare_identity(config, &handle)
        .await
        .map_err(FlowError::at(Step::Sign))?;

    let record = counter
        .increment(identity)
        .await
        .map_err(FlowError::at(Step::Submit))?;
    let tx_hash = record.hash();

    let receipt = ConfirmationWaiter::new(&handle, &config.transaction)
        .wait(record, shutdown)
        .await
        .map_err(FlowError::at(Step::Confirm))?;

    let after = counter
        .read_count()
        .await
        .map_err(FlowError::at(Step::ReadAfter))?;

    if before.get().checked_add(U256::from(1)) != Some(after.get()) {
        // Other senders may have touched the counter in between.
        tracing::warn!(before = %before, after = %after, "Counter moved by more than one");
    }
    tracing::info!(count = %after, block_number = receipt.block_number, "Counter after increment");

    Ok(IncrementReport {
        contract: counter.address(),
        before,
        tx_hash,
        receipt,
        after,
    })
}

async fn prepare_identity(
    config: &InteractConfig,
    handle: &ConnectionHandle,
) -> Result<SigningIdentity, InteractError> {
    let secret = config.signer.private_key.as_ref().ok_or_else(|| {
        InteractError::KeyFormat(
            "no private key configured; set COUNTER_PRIVATE_KEY or signer.private_key".to_string(),
        )
    })?;

    let mut identity = SigningIdentity::from_private_key(secret.expose(), config.network.chain_id)?;
    identity.set_gas_limit(config.transaction.gas_limit);
    identity
        .resolve_gas_price(handle, config.transaction.max_gas_price_gwei)
        .await?;
    Ok(identity)
}
