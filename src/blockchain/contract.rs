//! Typed binding for the deployed counter contract.

use alloy::hex;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::ConnectionHandle;
use crate::blockchain::transaction::submit_call;
use crate::blockchain::types::{CounterValue, InteractError, InteractResult, TransactionRecord};
use crate::blockchain::wallet::SigningIdentity;

sol! {
    /// Method surface of the deployed counter.
    #[derive(Debug)]
    interface Counter {
        function getCount() external view returns (uint256);
        function increment() external;
    }
}

/// A counter contract at a fixed address, reached through one connection.
///
/// Construction only checks the address shape; a wrong address shows up on
/// the first call.
#[derive(Debug)]
pub struct CounterBinding<'a> {
    address: Address,
    handle: &'a ConnectionHandle,
}

impl<'a> CounterBinding<'a> {
    /// Bind from a hex address, `0x` prefix optional.
    pub fn new(address: &str, handle: &'a ConnectionHandle) -> InteractResult<Self> {
        let address = parse_address(address)?;
        Ok(Self::at(address, handle))
    }

    /// Bind from raw address bytes; anything but 20 bytes is rejected.
    pub fn from_bytes(bytes: &[u8], handle: &'a ConnectionHandle) -> InteractResult<Self> {
        Ok(Self::at(address_from_bytes(bytes)?, handle))
    }

    pub fn at(address: Address, handle: &'a ConnectionHandle) -> Self {
        tracing::debug!(contract = %address, "Counter binding created");
        Self { address, handle }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn handle(&self) -> &'a ConnectionHandle {
        self.handle
    }

    /// Read the counter at the latest block. Free and side-effect free.
    pub async fn read_count(&self) -> InteractResult<CounterValue> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(Counter::getCountCall {}.abi_encode());

        let output = self
            .handle
            .call(tx)
            .await
            .map_err(|e| InteractError::Query(e.to_string()))?;

        let count = Counter::getCountCall::abi_decode_returns(&output).map_err(|e| {
            InteractError::Query(format!(
                "cannot decode getCount() result 0x{}: {}",
                hex::encode(&output),
                e
            ))
        })?;

        tracing::debug!(contract = %self.address, count = %count, "Counter read");
        Ok(CounterValue::new(count))
    }

    /// Sign and submit `increment()`.
    ///
    /// Returns once the node accepts the transaction into its pool, before
    /// it is mined. The identity is spent whether or not submission succeeds.
    pub async fn increment(&self, identity: SigningIdentity) -> InteractResult<TransactionRecord> {
        let input = Bytes::from(Counter::incrementCall {}.abi_encode());
        submit_call(self.handle, self.address, input, identity).await
    }
}

const ADDRESS_LEN: usize = 20;

fn parse_address(raw: &str) -> InteractResult<Address> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| {
        InteractError::Binding(format!("contract address '{}' is not valid hex: {}", raw, e))
    })?;
    address_from_bytes(&bytes)
}

fn address_from_bytes(bytes: &[u8]) -> InteractResult<Address> {
    if bytes.len() != ADDRESS_LEN {
        return Err(InteractError::Binding(format!(
            "contract address must be {} bytes, got {}",
            ADDRESS_LEN,
            bytes.len()
        )));
    }
    Ok(Address::from_slice(bytes))
}
