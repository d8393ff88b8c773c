// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use ethereum_types::{Address, U256};
use rpc::{Bytes, CallRequest, EthApi, TransactionReceipt};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};
use types::base::TransactionHash;
use types::crypto::Wallet;
use types::transaction::LegacyTransaction;

use crate::error::{Error, OgResult};

/// Knobs for building, submitting and confirming transactions.
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    /// How long to wait for a receipt after submission.
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
    /// Submission attempts when the node rejects the nonce.
    pub max_retries: u32,
    /// Delay before resubmitting after a nonce rejection.
    pub retry_delay: Duration,
    /// Applied to `eth_estimateGas`, in percent.
    pub gas_multiplier_percent: u64,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
            max_retries: 5,
            retry_delay: Duration::from_secs(1),
            gas_multiplier_percent: 120,
        }
    }
}

/// Signs transactions for one wallet and drives them to a receipt.
///
/// Nonce selection and submission are serialized so concurrent callers
/// sharing a wallet never race for the same nonce.
pub struct TransactionBuilder {
    provider: Arc<dyn EthApi>,
    wallet: Wallet,
    settings: SubmitSettings,
    chain_id: OnceCell<u64>,
    submit_lock: Mutex<()>,
}

impl TransactionBuilder {
    pub fn new(
        provider: Arc<dyn EthApi>,
        wallet: Wallet,
        settings: SubmitSettings,
        chain_id: Option<u64>,
    ) -> Self {
        Self {
            provider,
            wallet,
            settings,
            chain_id: OnceCell::new_with(chain_id),
            submit_lock: Mutex::new(()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn EthApi> {
        &self.provider
    }

    pub fn sender(&self) -> Address {
        self.wallet.address()
    }

    /// Chain id used for EIP-155 signatures, fetched once from the node if
    /// the environment did not pin it.
    pub async fn chain_id(&self) -> OgResult<u64> {
        let id = self
            .chain_id
            .get_or_try_init(|| async { self.provider.chain_id().await })
            .await?;
        Ok(*id)
    }

    /// Fill nonce, gas price and gas limit for a call from this wallet.
    pub async fn build_transaction(
        &self,
        to: Option<Address>,
        data: Vec<u8>,
    ) -> OgResult<LegacyTransaction> {
        let chain_id = self.chain_id().await?;
        let sender = self.sender();
        let nonce = self.provider.transaction_count(sender).await?;
        let gas_price = self.provider.gas_price().await?;
        let estimate = self
            .provider
            .estimate_gas(&CallRequest {
                from: Some(sender),
                to,
                data: Bytes(data.clone()),
                ..Default::default()
            })
            .await?;
        let gas = scale_gas(estimate, self.settings.gas_multiplier_percent);

        Ok(LegacyTransaction {
            nonce,
            gas_price,
            gas,
            to,
            value: U256::zero(),
            data,
            chain_id,
        })
    }

    async fn submit_once(&self, to: Option<Address>, data: &[u8]) -> OgResult<TransactionHash> {
        let _guard = self.submit_lock.lock().await;
        let tx = self.build_transaction(to, data.to_vec()).await?;
        let (raw, hash) = self.wallet.sign_transaction(&tx)?;
        let node_hash = self.provider.send_raw_transaction(&raw).await?;
        if node_hash != hash {
            warn!(
                "Node reported hash {:?} for transaction {:?}",
                node_hash, hash
            );
        }
        info!(nonce = %tx.nonce, gas = %tx.gas, "Submitted transaction {:?}", node_hash);
        Ok(node_hash)
    }

    /// Submit a transaction, retrying nonce rejections up to `max_retries`
    /// attempts, and wait for its receipt.
    pub async fn send(
        &self,
        to: Option<Address>,
        data: Vec<u8>,
        max_retries: Option<u32>,
    ) -> OgResult<TransactionReceipt> {
        let attempts = max_retries.unwrap_or(self.settings.max_retries).max(1);
        let mut attempt = 0;
        let hash = loop {
            attempt += 1;
            match self.submit_once(to, &data).await {
                Ok(hash) => break hash,
                Err(Error::RpcError(e)) if e.is_nonce_error() && attempt < attempts => {
                    warn!(attempt, attempts, "Nonce rejected, retrying: {e}");
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        };
        self.wait_for_receipt(hash).await
    }

    /// Poll for the receipt until it appears or the confirmation timeout passes.
    pub async fn wait_for_receipt(&self, hash: TransactionHash) -> OgResult<TransactionReceipt> {
        let timeout = self.settings.confirmation_timeout;
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.provider.transaction_receipt(hash).await? {
                if !receipt.succeeded() {
                    return Err(Error::TransactionReverted(hash));
                }
                debug!(block = ?receipt.block_number, "Confirmed transaction {:?}", hash);
                return Ok(receipt);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::ConfirmationTimeout(hash, timeout.as_secs()));
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// Read-only `eth_call` from this wallet's address.
    pub async fn call(&self, to: Address, data: Vec<u8>) -> OgResult<Vec<u8>> {
        let output = self
            .provider
            .call(&CallRequest {
                from: Some(self.sender()),
                to: Some(to),
                data: Bytes(data),
                ..Default::default()
            })
            .await?;
        if output.is_empty() {
            return Err(Error::EmptyCallResult);
        }
        Ok(output)
    }
}

/// `estimate * percent / 100`, saturating at `U256::MAX`.
fn scale_gas(estimate: U256, percent: u64) -> U256 {
    estimate.saturating_mul(U256::from(percent)) / U256::from(100)
}
