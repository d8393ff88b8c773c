// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Client for running verifiable ML and LLM inference on the OpenGradient
//! network.
//!
//! Every inference is a transaction against the inference hub contract. The
//! client signs and submits it, waits for the receipt and decodes the result
//! from the event the contract emits.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rpc::{EthApi, HttpRpcClient, TransactionReceipt};
use tracing::info;
use types::abi::{Event, Token, Tokenizable};
use types::base::{parse_address, Address, TransactionHash, H256};
use types::contracts::{inference_hub, price_history_inference, workflow_scheduler};
use types::crypto::Wallet;
use types::inference::{
    InferenceMode, InferenceResult, LlmChatRequest, LlmCompletionRequest, TextGenerationOutput,
};
use types::tensor::{parse_number_tensors, ModelInput, ModelOutput, NumberTensor, RawModelOutput};
use types::workflow::{HistoricalInputQuery, SchedulerParams};

use crate::client_config::OgEnv;
use crate::error::{Error, OgResult};
use crate::transaction_builder::{SubmitSettings, TransactionBuilder};

pub mod client_config;
pub mod error;
pub mod global;
pub mod llm;
pub mod tools;
pub mod transaction_builder;

pub const DEFAULT_RPC_URL: &str = "http://18.188.176.119:8545";
pub const LOCAL_NETWORK_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_INFERENCE_CONTRACT_ADDRESS: &str = "0x8383C9bD7462F12Eb996DD02F78234C0421A6FaE";
pub const DEFAULT_SCHEDULER_ADDRESS: &str = "0x8383C9bD7462F12Eb996DD02F78234C0421A6FaE";

/// Builder for configuring an OgClient
pub struct OgClientBuilder {
    request_timeout: Duration,
    settings: SubmitSettings,
}

impl Default for OgClientBuilder {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            settings: SubmitSettings::default(),
        }
    }
}

impl OgClientBuilder {
    /// Set the per-request HTTP timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// How long to wait for a transaction receipt
    pub fn confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.settings.confirmation_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.settings.poll_interval = interval;
        self
    }

    /// Default submission attempts when the node rejects a nonce
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.settings.max_retries = max_retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.settings.retry_delay = delay;
        self
    }

    /// Scale applied to the node's gas estimate, e.g. `1.2`
    pub fn gas_multiplier(mut self, multiplier: f64) -> Self {
        self.settings.gas_multiplier_percent = (multiplier * 100.0).round().max(100.0) as u64;
        self
    }

    /// Build a client talking JSON-RPC to `env.rpc`
    pub fn build(self, private_key: &str, env: &OgEnv) -> OgResult<OgClient> {
        let wallet = Wallet::from_private_key(private_key)?;
        let provider = HttpRpcClient::new(&env.rpc, self.request_timeout)
            .map_err(|e| Error::ClientInitError(e.to_string()))?;
        Ok(self.build_with_provider(wallet, Arc::new(provider), env))
    }

    /// Build a client over any [`EthApi`] implementation
    pub fn build_with_provider(
        self,
        wallet: Wallet,
        provider: Arc<dyn EthApi>,
        env: &OgEnv,
    ) -> OgClient {
        info!(
            address = ?wallet.address(),
            env = %env.alias,
            "Initialized OpenGradient client"
        );
        OgClient {
            inner: Arc::new(TransactionBuilder::new(
                provider,
                wallet,
                self.settings,
                env.chain_id,
            )),
            inference_contract: env.inference_contract,
            scheduler_contract: env.scheduler_contract,
            expected_chain_id: env.chain_id,
        }
    }
}

/// The main OpenGradient client
#[derive(Clone)]
pub struct OgClient {
    inner: Arc<TransactionBuilder>,
    inference_contract: Address,
    scheduler_contract: Address,
    expected_chain_id: Option<u64>,
}

impl fmt::Debug for OgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OgClient")
            .field("address", &self.address())
            .field("inference_contract", &self.inference_contract)
            .field("scheduler_contract", &self.scheduler_contract)
            .field("expected_chain_id", &self.expected_chain_id)
            .finish_non_exhaustive()
    }
}

impl OgClient {
    /// Create a new client builder
    pub fn builder() -> OgClientBuilder {
        OgClientBuilder::default()
    }

    /// Client for `rpc_url` and `contract_address`, falling back to the
    /// devnet defaults.
    pub fn new(
        private_key: &str,
        rpc_url: Option<&str>,
        contract_address: Option<&str>,
    ) -> OgResult<Self> {
        let mut env = OgEnv::devnet();
        if let Some(rpc_url) = rpc_url {
            env.rpc = rpc_url.to_string();
        }
        if let Some(contract_address) = contract_address {
            env.inference_contract = parse_address(contract_address)?;
        }
        Self::builder().build(private_key, &env)
    }

    pub fn address(&self) -> Address {
        self.inner.sender()
    }

    pub fn inference_contract(&self) -> Address {
        self.inference_contract
    }

    pub fn scheduler_contract(&self) -> Address {
        self.scheduler_contract
    }

    pub fn provider(&self) -> &Arc<dyn EthApi> {
        self.inner.provider()
    }

    /// Verifies the node serves the chain the environment was configured for.
    pub async fn check_chain_id(&self) -> OgResult<u64> {
        let actual = self.inner.provider().chain_id().await?;
        match self.expected_chain_id {
            Some(expected) if expected != actual => {
                Err(Error::ChainIdMismatch { expected, actual })
            }
            _ => Ok(actual),
        }
    }

    /// Run `model_cid` on chain and return its numeric output tensors.
    pub async fn infer(
        &self,
        model_cid: &str,
        inference_mode: InferenceMode,
        model_input: ModelInput,
        max_retries: Option<u32>,
    ) -> OgResult<InferenceResult> {
        info!(model_cid, mode = %inference_mode, "Running inference");
        let data = inference_hub::run().encode_input(&[
            Token::String(model_cid.to_string()),
            inference_mode.into_token(),
            model_input.into_token(),
        ])?;
        let receipt = self
            .inner
            .send(Some(self.inference_contract), data, max_retries)
            .await?;

        let [output] = self.decode_event(&inference_hub::inference_result(), &receipt)?;
        let [numbers] = output.into_fixed_tuple::<1>()?;
        let numbers = Vec::<NumberTensor>::from_token(numbers)?;
        Ok(InferenceResult {
            transaction_hash: receipt.transaction_hash,
            model_output: parse_number_tensors(&numbers)?,
        })
    }

    pub async fn llm_chat(
        &self,
        request: LlmChatRequest,
        max_retries: Option<u32>,
    ) -> OgResult<TextGenerationOutput> {
        info!(model_cid = %request.model_cid, mode = %request.mode, "Running LLM chat");
        let data = inference_hub::run_llm_chat().encode_input(&[request.try_into_token()?])?;
        let receipt = self
            .inner
            .send(Some(self.inference_contract), data, max_retries)
            .await?;

        let [response] = self.decode_event(&inference_hub::llm_chat_result(), &receipt)?;
        Ok(TextGenerationOutput::from_chat_response(
            receipt.transaction_hash,
            response,
        )?)
    }

    pub async fn llm_completion(
        &self,
        request: LlmCompletionRequest,
        max_retries: Option<u32>,
    ) -> OgResult<TextGenerationOutput> {
        info!(model_cid = %request.model_cid, mode = %request.mode, "Running LLM completion");
        let data =
            inference_hub::run_llm_completion().encode_input(&[request.try_into_token()?])?;
        let receipt = self
            .inner
            .send(Some(self.inference_contract), data, max_retries)
            .await?;

        let [response] = self.decode_event(&inference_hub::llm_completion_result(), &receipt)?;
        Ok(TextGenerationOutput::from_completion_response(
            receipt.transaction_hash,
            response,
        )?)
    }

    /// Deploy a workflow contract and, with `scheduler_params`, register it
    /// with the scheduler. Returns the deployed contract address.
    pub async fn new_workflow(
        &self,
        model_cid: &str,
        input_query: &HistoricalInputQuery,
        input_tensor_name: &str,
        scheduler_params: Option<SchedulerParams>,
        bytecode: &[u8],
    ) -> OgResult<Address> {
        if bytecode.is_empty() {
            return Err(Error::MissingWorkflowBytecode);
        }
        let data = price_history_inference::constructor().encode_input(
            bytecode,
            &[
                Token::String(model_cid.to_string()),
                Token::String(input_tensor_name.to_string()),
                input_query.to_abi_format(),
            ],
        )?;
        let receipt = self.inner.send(None, data, None).await?;
        let contract_address = receipt
            .contract_address
            .ok_or(Error::MissingContractAddress(receipt.transaction_hash))?;
        info!(model_cid, "Deployed workflow contract {:?}", contract_address);

        if let Some(params) = scheduler_params {
            let data = workflow_scheduler::register_task().encode_input(&[
                Token::Address(contract_address),
                Token::uint(params.end_time),
                Token::uint(params.frequency),
            ])?;
            self.inner
                .send(Some(self.scheduler_contract), data, None)
                .await?;
            info!(
                frequency = params.frequency,
                end_time = params.end_time,
                "Registered workflow {:?} with scheduler",
                contract_address
            );
        }
        Ok(contract_address)
    }

    /// Latest result stored by a workflow contract.
    pub async fn read_workflow_result(&self, contract_address: Address) -> OgResult<ModelOutput> {
        let function = price_history_inference::get_inference_result();
        let output = self
            .inner
            .call(contract_address, function.encode_input(&[])?)
            .await?;
        let [result] = into_array(function.decode_output(&output)?)?;
        Ok(RawModelOutput::from_token(result)?.decode()?)
    }

    /// Up to `num_results` most recent results of a workflow contract.
    pub async fn read_workflow_history(
        &self,
        contract_address: Address,
        num_results: u64,
    ) -> OgResult<Vec<ModelOutput>> {
        let function = price_history_inference::get_last_inference_results();
        let output = self
            .inner
            .call(contract_address, function.encode_input(&[Token::uint(num_results)])?)
            .await?;
        let [results] = into_array(function.decode_output(&output)?)?;
        Vec::<RawModelOutput>::from_token(results)?
            .iter()
            .map(|raw| raw.decode().map_err(Error::from))
            .collect()
    }

    /// Decode the data of the first `event` log emitted by the inference
    /// contract in `receipt`.
    fn decode_event<const N: usize>(
        &self,
        event: &Event,
        receipt: &TransactionReceipt,
    ) -> OgResult<[Token; N]> {
        let topic = H256::from(event.topic());
        let log = receipt
            .logs
            .iter()
            .find(|log| {
                log.address == self.inference_contract && log.topics.first() == Some(&topic)
            })
            .ok_or_else(|| Error::EventNotFound {
                event: event.name.clone(),
                transaction: receipt.transaction_hash,
            })?;
        into_array(event.decode_data(log.data.as_ref())?)
    }

    pub async fn wait_for_receipt(&self, hash: TransactionHash) -> OgResult<TransactionReceipt> {
        self.inner.wait_for_receipt(hash).await
    }
}

fn into_array<const N: usize>(tokens: Vec<Token>) -> OgResult<[Token; N]> {
    Ok(Token::Tuple(tokens).into_fixed_tuple::<N>()?)
}
