// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory node used by the SDK integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rpc::{Bytes, CallRequest, EthApi, Log, RpcError, RpcResult, TransactionReceipt};
use sdk::client_config::OgEnv;
use sdk::{OgClient, OgClientBuilder};
use types::abi::{encode, Event, Token, Tokenizable};
use ethereum_types::U64;
use types::base::{Address, H256, U256};
use types::crypto::{keccak256, Wallet};
use types::tensor::NumberTensor;

pub const CHAIN_ID: u64 = 0xefca;
pub const GAS_ESTIMATE: u64 = 100_000;
pub const GAS_PRICE: u64 = 1_000_000_000;
pub const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn inference_contract() -> Address {
    Address::repeat_byte(0x83)
}

pub fn scheduler_contract() -> Address {
    Address::repeat_byte(0x5c)
}

pub fn test_env() -> OgEnv {
    OgEnv {
        alias: "test".to_string(),
        rpc: "http://127.0.0.1:8545".to_string(),
        inference_contract: inference_contract(),
        scheduler_contract: scheduler_contract(),
        chain_id: Some(CHAIN_ID),
    }
}

/// `InferenceResult` event data: the output tuple holding only number tensors.
pub fn inference_output(numbers: Vec<NumberTensor>) -> Token {
    Token::Tuple(vec![numbers.into_token()])
}

/// How the node answers receipt queries for the next submitted transaction.
#[derive(Debug, Clone, Default)]
pub struct ReceiptPlan {
    pub reverted: bool,
    pub logs: Vec<Log>,
    pub contract_address: Option<Address>,
    /// Receipt polls answered with `null` before the receipt appears.
    pub pending_polls: u32,
}

impl ReceiptPlan {
    pub fn with_event(event: &Event, emitter: Address, tokens: Vec<Token>) -> Self {
        Self {
            logs: vec![Log {
                address: emitter,
                topics: vec![H256::from(event.topic())],
                data: Bytes(encode(&tokens)),
                log_index: None,
            }],
            ..Default::default()
        }
    }

    pub fn never_mined() -> Self {
        Self {
            pending_polls: u32::MAX,
            ..Default::default()
        }
    }
}

#[derive(Default)]
struct State {
    nonce: u64,
    gas_estimate: Option<U256>,
    sent: Vec<Vec<u8>>,
    calls: Vec<CallRequest>,
    send_errors: VecDeque<RpcError>,
    plans: VecDeque<ReceiptPlan>,
    call_responses: VecDeque<Vec<u8>>,
    receipts: HashMap<H256, (u32, TransactionReceipt)>,
}

pub struct MockNode {
    state: Mutex<State>,
}

impl MockNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
        })
    }

    pub fn push_receipt(&self, plan: ReceiptPlan) {
        self.state.lock().plans.push_back(plan);
    }

    pub fn push_send_error(&self, message: &str) {
        self.state.lock().send_errors.push_back(RpcError::JsonRpc {
            code: -32000,
            message: message.to_string(),
        });
    }

    pub fn push_call_response(&self, tokens: Vec<Token>) {
        self.state.lock().call_responses.push_back(encode(&tokens));
    }

    /// Raw transactions accepted so far.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.lock().sent.clone()
    }

    pub fn calls(&self) -> Vec<CallRequest> {
        self.state.lock().calls.clone()
    }

    pub fn set_gas_estimate(&self, estimate: U256) {
        self.state.lock().gas_estimate = Some(estimate);
    }

    pub fn client(self: &Arc<Self>) -> OgClient {
        self.client_with(OgClient::builder())
    }

    /// Client from `builder`, with polling tightened for tests.
    pub fn client_with(self: &Arc<Self>, builder: OgClientBuilder) -> OgClient {
        builder
            .poll_interval(Duration::from_millis(5))
            .retry_delay(Duration::from_millis(5))
            .confirmation_timeout(Duration::from_millis(200))
            .build_with_provider(
                Wallet::from_private_key(ANVIL_KEY).unwrap(),
                self.clone(),
                &test_env(),
            )
    }
}

/// `(nonce, gasPrice, gas)` of a signed legacy transaction.
pub fn decode_gas_fields(raw: &[u8]) -> (U256, U256, U256) {
    let rlp = rlp::Rlp::new(raw);
    (
        rlp.val_at(0).unwrap(),
        rlp.val_at(1).unwrap(),
        rlp.val_at(2).unwrap(),
    )
}

/// `(to, calldata)` of a signed legacy transaction.
pub fn decode_raw(raw: &[u8]) -> (Option<Address>, Vec<u8>) {
    let rlp = rlp::Rlp::new(raw);
    let to: Vec<u8> = rlp.at(3).unwrap().data().unwrap().to_vec();
    let data = rlp.at(5).unwrap().data().unwrap().to_vec();
    let to = (!to.is_empty()).then(|| Address::from_slice(&to));
    (to, data)
}

#[async_trait]
impl EthApi for MockNode {
    async fn chain_id(&self) -> RpcResult<u64> {
        Ok(CHAIN_ID)
    }

    async fn transaction_count(&self, _address: Address) -> RpcResult<U256> {
        Ok(U256::from(self.state.lock().nonce))
    }

    async fn gas_price(&self) -> RpcResult<U256> {
        Ok(U256::from(GAS_PRICE))
    }

    async fn estimate_gas(&self, _call: &CallRequest) -> RpcResult<U256> {
        Ok(self
            .state
            .lock()
            .gas_estimate
            .unwrap_or_else(|| U256::from(GAS_ESTIMATE)))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> RpcResult<H256> {
        let mut state = self.state.lock();
        if let Some(error) = state.send_errors.pop_front() {
            return Err(error);
        }
        let hash = H256::from(keccak256(raw));
        let plan = state.plans.pop_front().unwrap_or_default();
        let receipt = TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(1u64.into()),
            status: Some(U64::from(u64::from(!plan.reverted))),
            contract_address: plan.contract_address,
            gas_used: Some(U256::from(21_000)),
            logs: plan.logs,
        };
        state.receipts.insert(hash, (plan.pending_polls, receipt));
        state.sent.push(raw.to_vec());
        state.nonce += 1;
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: H256) -> RpcResult<Option<TransactionReceipt>> {
        let mut state = self.state.lock();
        match state.receipts.get_mut(&hash) {
            Some((pending, _)) if *pending > 0 => {
                *pending -= 1;
                Ok(None)
            }
            Some((_, receipt)) => Ok(Some(receipt.clone())),
            None => Ok(None),
        }
    }

    async fn call(&self, call: &CallRequest) -> RpcResult<Vec<u8>> {
        let mut state = self.state.lock();
        state.calls.push(call.clone());
        Ok(state.call_responses.pop_front().unwrap_or_default())
    }
}
