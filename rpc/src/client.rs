// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ethereum_types::{Address, H256, U256, U64};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::{RpcError, RpcResult};
use crate::types::{Bytes, CallRequest, TransactionReceipt};
use crate::EthApi;

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 over HTTP POST.
pub struct HttpRpcClient {
    url: Url,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(url: &str, request_timeout: Duration) -> RpcResult<Self> {
        let url = Url::parse(url).map_err(|e| RpcError::InvalidUrl(format!("{url}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            url,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue a single JSON-RPC call and decode its `result`.
    pub async fn request<P, R>(&self, method: &str, params: P) -> RpcResult<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "json-rpc request");

        let response = self
            .http
            .post(self.url.clone())
            .json(&Request {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: Response = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(RpcError::HttpStatus {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => return Err(RpcError::InvalidResponse(format!("{method}: {e}"))),
        };

        if let Some(error) = parsed.error {
            debug!(method, id, code = error.code, "json-rpc error: {}", error.message);
            return Err(RpcError::JsonRpc {
                code: error.code,
                message: error.message,
            });
        }

        serde_json::from_value(parsed.result)
            .map_err(|e| RpcError::InvalidResponse(format!("{method}: {e}")))
    }
}

#[async_trait]
impl EthApi for HttpRpcClient {
    async fn chain_id(&self) -> RpcResult<u64> {
        let id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(id.as_u64())
    }

    async fn transaction_count(&self, address: Address) -> RpcResult<U256> {
        self.request("eth_getTransactionCount", json!([address, "pending"]))
            .await
    }

    async fn gas_price(&self) -> RpcResult<U256> {
        self.request("eth_gasPrice", json!([])).await
    }

    async fn estimate_gas(&self, call: &CallRequest) -> RpcResult<U256> {
        self.request("eth_estimateGas", json!([call])).await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> RpcResult<H256> {
        self.request("eth_sendRawTransaction", json!([Bytes(raw.to_vec())]))
            .await
    }

    async fn transaction_receipt(&self, hash: H256) -> RpcResult<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    async fn call(&self, call: &CallRequest) -> RpcResult<Vec<u8>> {
        let bytes: Bytes = self.request("eth_call", json!([call, "latest"])).await?;
        Ok(bytes.0)
    }
}
