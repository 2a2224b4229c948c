//! In-process mock JSON-RPC node for integration tests.
//!
//! Holds one counter contract, accepts signed raw transactions and produces
//! receipts, with switches for the failure modes the tests need.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::hex;
use alloy::primitives::{address, keccak256, Address, Bytes, TxHash, B256, U256};
use axum::extract::State;
use axum::Json;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use counter_interact::config::{InteractConfig, SecretString};

/// Anvil's first account.
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const COUNTER_ADDRESS: Address = address!("416330B109993786f2c93Cf176d575C7d73179e8");

pub const TEST_CHAIN_ID: u64 = 31337;

const GET_COUNT_SELECTOR: [u8; 4] = [0xa8, 0x7d, 0x94, 0x2c];
const INCREMENT_SELECTOR: [u8; 4] = [0xd0, 0x9d, 0xe0, 0x8a];

/// A raw transaction the node accepted.
#[derive(Debug, Clone)]
pub struct SubmittedTx {
    pub hash: TxHash,
    pub to: Option<Address>,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: Option<u128>,
    pub chain_id: Option<u64>,
    pub input: Bytes,
}

/// Mutable node state, shared with the HTTP handler.
#[derive(Debug)]
pub struct NodeState {
    pub chain_id: u64,
    pub contract: Address,
    pub counter: U256,
    pub gas_price: u128,
    pub block_number: u64,
    pub next_nonce: u64,
    /// Mine each transaction as soon as it is submitted.
    pub auto_mine: bool,
    /// Mined increments report failure and leave the counter alone.
    pub revert_increments: bool,
    pub fail_gas_price: bool,
    /// Reject raw transactions with this message.
    pub reject_transactions: Option<String>,
    pub pending: Vec<SubmittedTx>,
    pub submitted: Vec<SubmittedTx>,
    pub receipts: HashMap<TxHash, Value>,
    /// Every JSON-RPC method received, in order.
    pub requests: Vec<String>,
}

impl NodeState {
    fn new(initial_count: u64) -> Self {
        Self {
            chain_id: TEST_CHAIN_ID,
            contract: COUNTER_ADDRESS,
            counter: U256::from(initial_count),
            gas_price: 2_000_000_000,
            block_number: 100,
            next_nonce: 0,
            auto_mine: true,
            revert_increments: false,
            fail_gas_price: false,
            reject_transactions: None,
            pending: Vec::new(),
            submitted: Vec::new(),
            receipts: HashMap::new(),
            requests: Vec::new(),
        }
    }

    fn mine(&mut self, tx: SubmittedTx) {
        self.block_number += 1;
        let is_increment = tx.to == Some(self.contract) && tx.input.starts_with(&INCREMENT_SELECTOR);
        let success = !(is_increment && self.revert_increments);
        if is_increment && success {
            self.counter += U256::from(1);
        }

        let receipt = json!({
            "type": "0x0",
            "status": if success { "0x1" } else { "0x0" },
            "cumulativeGasUsed": "0xa8c0",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": tx.hash.to_string(),
            "transactionIndex": "0x0",
            "blockHash": B256::from(U256::from(self.block_number).to_be_bytes::<32>()).to_string(),
            "blockNumber": format!("{:#x}", self.block_number),
            "gasUsed": "0xa8c0",
            "effectiveGasPrice": format!("{:#x}", tx.gas_price.unwrap_or(self.gas_price)),
            "from": Address::ZERO.to_string(),
            "to": tx.to.map(|a| a.to_string()),
            "contractAddress": null
        });
        self.receipts.insert(tx.hash, receipt);
    }

    pub fn count_requests(&self, method: &str) -> usize {
        self.requests.iter().filter(|m| m.as_str() == method).count()
    }
}

/// Handle to a running mock node.
pub struct MockNode {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<NodeState>>,
}

impl MockNode {
    /// Start a node on an ephemeral port with the counter at `initial_count`.
    pub async fn start(initial_count: u64) -> Self {
        let state = Arc::new(Mutex::new(NodeState::new(initial_count)));
        let app = Router::new().fallback(handle_rpc).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Endpoint URL with an API-key style path, like hosted providers use.
    pub fn endpoint(&self) -> String {
        format!("http://{}/v3/abc", self.addr)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut NodeState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    /// Mine everything waiting in the pool. Returns how many were mined.
    pub fn mine_pending(&self) -> usize {
        self.with_state(|state| {
            let pending = std::mem::take(&mut state.pending);
            let count = pending.len();
            for tx in pending {
                state.mine(tx);
            }
            count
        })
    }

    pub fn advance_blocks(&self, blocks: u64) {
        self.with_state(|state| state.block_number += blocks);
    }

    pub fn counter(&self) -> U256 {
        self.with_state(|state| state.counter)
    }

    /// Config pointing at this node, with fast polling.
    pub fn config(&self) -> InteractConfig {
        let mut config = InteractConfig::default();
        config.network.endpoint = self.endpoint();
        config.network.chain_id = TEST_CHAIN_ID;
        config.network.rpc_timeout_secs = 2;
        config.contract.address = COUNTER_ADDRESS.to_string();
        config.signer.private_key = Some(SecretString::new(TEST_PRIVATE_KEY));
        config.transaction.gas_limit = 300_000;
        config.transaction.poll_interval_ms = 20;
        config.transaction.confirmation_timeout_secs = 5;
        config
    }
}

async fn handle_rpc(
    State(state): State<Arc<Mutex<NodeState>>>,
    Json(request): Json<Value>,
) -> Json<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    let mut state = state.lock().unwrap();
    state.requests.push(method.clone());

    let outcome = dispatch(&mut state, &method, &params);
    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": message }
        }),
    })
}

fn dispatch(state: &mut NodeState, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "eth_chainId" => Ok(json!(format!("{:#x}", state.chain_id))),
        "eth_blockNumber" => Ok(json!(format!("{:#x}", state.block_number))),
        "eth_gasPrice" => {
            if state.fail_gas_price {
                Err("gas price oracle unavailable".to_string())
            } else {
                Ok(json!(format!("{:#x}", state.gas_price)))
            }
        }
        "eth_getTransactionCount" => Ok(json!(format!("{:#x}", state.next_nonce))),
        "eth_call" => eth_call(state, &params[0]),
        "eth_sendRawTransaction" => send_raw(state, params[0].as_str().unwrap_or_default()),
        "eth_getTransactionReceipt" => {
            let hash: TxHash = params[0]
                .as_str()
                .unwrap_or_default()
                .parse()
                .map_err(|e| format!("bad hash: {}", e))?;
            Ok(state.receipts.get(&hash).cloned().unwrap_or(Value::Null))
        }
        other => Err(format!("method {} not supported", other)),
    }
}

fn eth_call(state: &NodeState, tx: &Value) -> Result<Value, String> {
    let to: Option<Address> = tx["to"].as_str().and_then(|s| s.parse().ok());
    let input = tx
        .get("input")
        .or_else(|| tx.get("data"))
        .and_then(Value::as_str)
        .unwrap_or("0x");
    let input = hex::decode(input).map_err(|e| format!("bad input: {}", e))?;

    if to != Some(state.contract) {
        // No code at the address: calls succeed with empty output.
        return Ok(json!("0x"));
    }
    if input.starts_with(&GET_COUNT_SELECTOR) {
        Ok(json!(B256::from(state.counter.to_be_bytes::<32>()).to_string()))
    } else {
        Err("execution reverted".to_string())
    }
}

fn send_raw(state: &mut NodeState, raw: &str) -> Result<Value, String> {
    if let Some(message) = &state.reject_transactions {
        return Err(message.clone());
    }

    let bytes = hex::decode(raw).map_err(|e| format!("bad raw transaction: {}", e))?;
    let envelope = TxEnvelope::decode_2718(&mut bytes.as_slice())
        .map_err(|e| format!("rlp: {}", e))?;

    if envelope.nonce() != state.next_nonce {
        return Err(format!(
            "nonce too low: next nonce {}, tx nonce {}",
            state.next_nonce,
            envelope.nonce()
        ));
    }
    state.next_nonce += 1;

    let tx = SubmittedTx {
        hash: keccak256(&bytes),
        to: envelope.to(),
        nonce: envelope.nonce(),
        gas_limit: envelope.gas_limit(),
        gas_price: envelope.gas_price(),
        chain_id: envelope.chain_id(),
        input: envelope.input().clone(),
    };
    state.submitted.push(tx.clone());

    let hash = tx.hash;
    if state.auto_mine {
        state.mine(tx);
    } else {
        state.pending.push(tx);
    }
    Ok(json!(hash.to_string()))
}
