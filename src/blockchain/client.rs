//! Node connection handle with per-request timeouts.
//!
//! # Responsibilities
//! - Validate the endpoint and open an HTTP JSON-RPC provider
//! - Probe reachability and the served chain ID on connect
//! - Bound every RPC round trip by the configured timeout
//! - Log release of the connection when the handle goes out of scope

use std::fmt;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::eips::BlockId;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use thiserror::Error;
use tokio::time::timeout;

use crate::blockchain::types::{ChainId, InteractError, InteractResult};
use crate::config::NetworkConfig;
use crate::observability::metrics;

/// Failure of a single RPC round trip.
///
/// Callers fold this into the error kind of the step they are performing.
#[derive(Debug, Error)]
pub enum RpcFailure {
    #[error("{method} timed out after {}ms", .after.as_millis())]
    Timeout {
        method: &'static str,
        after: Duration,
    },

    #[error("{method} failed: {message}")]
    Transport {
        method: &'static str,
        message: String,
    },
}

/// An open connection to one node endpoint.
///
/// Not shared between flows; every operation borrows it for one round trip.
pub struct ConnectionHandle {
    provider: Box<dyn Provider + Send + Sync>,
    endpoint: url::Url,
    chain_id: ChainId,
    timeout_duration: Duration,
}

impl ConnectionHandle {
    /// Open a connection and verify the node serves the configured chain.
    ///
    /// Fails with [`InteractError::Connection`] when the endpoint is malformed
    /// or unreachable, and [`InteractError::ChainMismatch`] when the node
    /// reports a different chain ID.
    pub async fn connect(config: &NetworkConfig) -> InteractResult<Self> {
        let endpoint = parse_endpoint(&config.endpoint)?;

        // Nonce, gas and chain ID are filled explicitly on the write path.
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(endpoint.clone());

        let handle = Self {
            provider: Box::new(provider),
            endpoint,
            chain_id: ChainId(config.chain_id),
            timeout_duration: config.rpc_timeout(),
        };

        let actual = handle.get_chain_id().await.map_err(|e| {
            InteractError::Connection(format!(
                "node at {} unreachable: {}",
                handle.redacted_endpoint(),
                e
            ))
        })?;
        if actual != config.chain_id {
            return Err(InteractError::ChainMismatch {
                expected: config.chain_id,
                actual,
            });
        }

        tracing::info!(
            endpoint = %handle.redacted_endpoint(),
            chain_id = config.chain_id,
            "Connected to node"
        );

        Ok(handle)
    }

    async fn request<T, E, F>(&self, method: &'static str, fut: F) -> Result<T, RpcFailure>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => {
                metrics::record_rpc(method, "ok");
                Ok(value)
            }
            Ok(Err(e)) => {
                metrics::record_rpc(method, "error");
                Err(RpcFailure::Transport {
                    method,
                    message: scrub_endpoint(&e.to_string(), &self.endpoint),
                })
            }
            Err(_) => {
                metrics::record_rpc(method, "timeout");
                Err(RpcFailure::Timeout {
                    method,
                    after: self.timeout_duration,
                })
            }
        }
    }

    /// Chain ID reported by the node.
    pub async fn get_chain_id(&self) -> Result<u64, RpcFailure> {
        self.request("eth_chainId", self.provider.get_chain_id()).await
    }

    /// Latest block number.
    pub async fn get_block_number(&self) -> Result<u64, RpcFailure> {
        self.request("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    /// Suggested legacy gas price in wei.
    pub async fn get_gas_price(&self) -> Result<u128, RpcFailure> {
        self.request("eth_gasPrice", self.provider.get_gas_price()).await
    }

    /// Next nonce for `address`, counting transactions still in the pool.
    pub async fn get_pending_nonce(&self, address: Address) -> Result<u64, RpcFailure> {
        self.request(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    /// Execute a read-only call against the latest block.
    pub async fn call(&self, tx: TransactionRequest) -> Result<Bytes, RpcFailure> {
        self.request(
            "eth_call",
            self.provider.call(tx).block(BlockId::latest()),
        )
        .await
    }

    /// Broadcast an already signed, EIP-2718 encoded transaction.
    pub async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, RpcFailure> {
        let pending = self
            .request(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(encoded),
            )
            .await?;
        Ok(*pending.tx_hash())
    }

    /// Receipt for `tx_hash`, `None` while the transaction is unmined.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcFailure> {
        self.request(
            "eth_getTransactionReceipt",
            self.provider.get_transaction_receipt(tx_hash),
        )
        .await
    }

    /// Chain ID the handle was verified against.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    /// Endpoint without path or query, which often carry API keys.
    pub fn redacted_endpoint(&self) -> String {
        redact_endpoint(&self.endpoint)
    }

    pub fn rpc_timeout(&self) -> Duration {
        self.timeout_duration
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        tracing::debug!(endpoint = %self.redacted_endpoint(), "Connection released");
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("endpoint", &self.redacted_endpoint())
            .field("chain_id", &self.chain_id.0)
            .field("timeout_ms", &self.timeout_duration.as_millis())
            .finish()
    }
}

fn parse_endpoint(raw: &str) -> InteractResult<url::Url> {
    let endpoint: url::Url = raw
        .trim()
        .parse()
        .map_err(|e| InteractError::Connection(format!("invalid endpoint URL: {}", e)))?;

    match endpoint.scheme() {
        "http" | "https" => Ok(endpoint),
        other => Err(InteractError::Connection(format!(
            "unsupported endpoint scheme '{}', expected http or https",
            other
        ))),
    }
}

/// Replace every occurrence of the full endpoint in `message` with its
/// redacted form. HTTP transport errors quote the request URL verbatim.
fn scrub_endpoint(message: &str, url: &url::Url) -> String {
    let redacted = redact_endpoint(url);
    let full = url.as_str();
    let message = message.replace(full, &redacted);
    match full.strip_suffix('/') {
        Some(bare) if !bare.is_empty() => message.replace(bare, &redacted),
        _ => message,
    }
}

fn redact_endpoint(url: &url::Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        _ => url.scheme().to_string(),
    }
}
