//! Transaction signing, submission, and confirmation monitoring.
//!
//! # Responsibilities
//! - Build a legacy transaction from a ready signing identity
//! - Sign locally and broadcast the raw payload
//! - Poll for the receipt under a deadline and a cancellation signal
//!
//! Submissions are never retried: resending a signed payload can
//! double-submit or orphan state.

use std::time::{Duration, Instant};

use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, TxHash};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::ConnectionHandle;
use crate::blockchain::types::{
    ConfirmationReceipt, InteractError, InteractResult, TransactionRecord,
};
use crate::blockchain::wallet::SigningIdentity;
use crate::config::TransactionConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Sign `input` as a call to `to` and hand it to the node.
///
/// The identity must carry a gas limit and a resolved gas price; nothing is
/// sent otherwise.
pub async fn submit_call(
    handle: &ConnectionHandle,
    to: Address,
    input: Bytes,
    identity: SigningIdentity,
) -> InteractResult<TransactionRecord> {
    let (gas_limit, gas_price) = identity.ensure_ready()?;

    if identity.chain_id() != handle.chain_id().0 {
        return Err(InteractError::Submission(format!(
            "identity signs for chain {} but the node serves chain {}",
            identity.chain_id(),
            handle.chain_id().0
        )));
    }

    let from = identity.address();
    let nonce = handle
        .get_pending_nonce(from)
        .await
        .map_err(|e| InteractError::Submission(format!("nonce lookup: {}", e)))?;

    let tx = TransactionRequest::default()
        .with_from(from)
        .with_to(to)
        .with_input(input)
        .with_nonce(nonce)
        .with_gas_price(gas_price)
        .with_gas_limit(gas_limit)
        .with_chain_id(identity.chain_id());

    let envelope = tx
        .build(&identity.wallet())
        .await
        .map_err(|e| InteractError::Submission(format!("signing failed: {}", e)))?;
    let encoded = envelope.encoded_2718();
    let local_hash = keccak256(&encoded);

    let tx_hash = handle
        .send_raw_transaction(&encoded)
        .await
        .map_err(|e| InteractError::Submission(e.to_string()))?;

    if tx_hash != local_hash {
        tracing::warn!(
            node_hash = %tx_hash,
            local_hash = %local_hash,
            "Node reported a different transaction hash"
        );
    }

    metrics::record_submission();
    tracing::info!(
        tx_hash = %tx_hash,
        from = %from,
        nonce = nonce,
        gas_limit = gas_limit,
        gas_price_wei = gas_price,
        "Transaction submitted"
    );

    Ok(TransactionRecord::new(tx_hash, from, to, nonce, gas_limit, gas_price))
}

/// Blocks until a submitted transaction is mined, fails, or the wait ends.
#[derive(Debug)]
pub struct ConfirmationWaiter<'a> {
    handle: &'a ConnectionHandle,
    poll_interval: Duration,
    default_timeout: Duration,
    required_confirmations: u64,
}

impl<'a> ConfirmationWaiter<'a> {
    pub fn new(handle: &'a ConnectionHandle, config: &TransactionConfig) -> Self {
        Self {
            handle,
            poll_interval: config.poll_interval(),
            default_timeout: config.confirmation_timeout(),
            required_confirmations: config.required_confirmations.max(1),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Blocks required including the inclusion block; zero counts as one.
    pub fn with_required_confirmations(mut self, required: u64) -> Self {
        self.required_confirmations = required.max(1);
        self
    }

    /// Wait with the configured default deadline.
    pub async fn wait(
        &self,
        record: TransactionRecord,
        shutdown: &Shutdown,
    ) -> InteractResult<ConfirmationReceipt> {
        self.wait_with_timeout(record, self.default_timeout, shutdown)
            .await
    }

    /// Wait until mined, `deadline` elapses, or `shutdown` is triggered.
    ///
    /// The connection stays usable whichever way the wait ends.
    pub async fn wait_with_timeout(
        &self,
        record: TransactionRecord,
        deadline: Duration,
        shutdown: &Shutdown,
    ) -> InteractResult<ConfirmationReceipt> {
        let tx_hash = record.hash();
        let started = Instant::now();

        tracing::info!(
            tx_hash = %tx_hash,
            timeout_ms = saturating_millis(deadline),
            "Waiting for confirmation"
        );

        let outcome = tokio::select! {
            result = timeout(deadline, self.poll(tx_hash)) => match result {
                Ok(outcome) => outcome,
                Err(_) => Err(InteractError::ConfirmationTimeout {
                    tx_hash,
                    waited_ms: started.elapsed().as_millis(),
                }),
            },
            _ = shutdown.wait() => Err(InteractError::Cancelled { tx_hash }),
        };

        let label = match &outcome {
            Ok(_) => "confirmed",
            Err(InteractError::ConfirmationTimeout { .. }) => "timeout",
            Err(InteractError::Cancelled { .. }) => "cancelled",
            Err(_) => "failed",
        };
        metrics::record_confirmation_wait(label, started.elapsed());

        outcome
    }

    async fn poll(&self, tx_hash: TxHash) -> InteractResult<ConfirmationReceipt> {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            // Receipt lookups are reads, so transient failures just poll again.
            let receipt = match self.handle.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => receipt,
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                    continue;
                }
            };

            let Some(block_number) = receipt.block_number else {
                tracing::debug!(tx_hash = %tx_hash, "Receipt without block number");
                continue;
            };

            if !receipt.status() {
                return Err(InteractError::Confirmation {
                    tx_hash,
                    reason: format!("reverted in block {}", block_number),
                });
            }

            let confirmations = if self.required_confirmations == 1 {
                1
            } else {
                match self.handle.get_block_number().await {
                    Ok(current) => current.saturating_sub(block_number) + 1,
                    Err(e) => {
                        tracing::warn!(error = %e, "Block number lookup failed");
                        continue;
                    }
                }
            };

            if confirmations >= self.required_confirmations {
                tracing::info!(
                    tx_hash = %tx_hash,
                    block_number = block_number,
                    confirmations = confirmations,
                    "Transaction confirmed"
                );
                return Ok(to_confirmation(&receipt, block_number, confirmations));
            }

            tracing::debug!(
                tx_hash = %tx_hash,
                confirmations = confirmations,
                required = self.required_confirmations,
                "Waiting for confirmations"
            );
        }
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn to_confirmation(
    receipt: &TransactionReceipt,
    block_number: u64,
    confirmations: u64,
) -> ConfirmationReceipt {
    ConfirmationReceipt {
        tx_hash: receipt.transaction_hash,
        block_number,
        block_hash: receipt.block_hash,
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
        confirmations,
    }
}
