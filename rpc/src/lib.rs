// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Minimal Ethereum JSON-RPC client.
//!
//! [`EthApi`] is the seam the SDK talks to; [`HttpRpcClient`] implements it
//! over HTTP so tests can substitute an in-memory node.

use async_trait::async_trait;
use ethereum_types::{Address, H256, U256};

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpRpcClient;
pub use error::{RpcError, RpcResult};
pub use types::{Bytes, CallRequest, Log, TransactionReceipt};

/// The subset of the `eth_` namespace the SDK relies on.
#[async_trait]
pub trait EthApi: Send + Sync {
    /// `eth_chainId`
    async fn chain_id(&self) -> RpcResult<u64>;

    /// `eth_getTransactionCount` at the `pending` block, i.e. the next usable nonce.
    async fn transaction_count(&self, address: Address) -> RpcResult<U256>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> RpcResult<U256>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, call: &CallRequest) -> RpcResult<U256>;

    /// `eth_sendRawTransaction`
    async fn send_raw_transaction(&self, raw: &[u8]) -> RpcResult<H256>;

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    async fn transaction_receipt(&self, hash: H256) -> RpcResult<Option<TransactionReceipt>>;

    /// `eth_call` against the latest block.
    async fn call(&self, call: &CallRequest) -> RpcResult<Vec<u8>>;
}
