// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Process-wide default client, for callers that prefer free functions over
//! passing an [`OgClient`] around.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use types::inference::{
    InferenceMode, InferenceResult, LlmChatRequest, LlmCompletionRequest, TextGenerationOutput,
};
use types::tensor::ModelInput;

use crate::error::{Error, OgResult};
use crate::OgClient;

static DEFAULT_CLIENT: Lazy<RwLock<Option<Arc<OgClient>>>> = Lazy::new(|| RwLock::new(None));

/// Create a client and install it as the default, replacing any previous one.
pub fn init(
    private_key: &str,
    rpc_url: Option<&str>,
    contract_address: Option<&str>,
) -> OgResult<Arc<OgClient>> {
    let client = Arc::new(OgClient::new(private_key, rpc_url, contract_address)?);
    set_default_client(client.clone());
    Ok(client)
}

pub fn set_default_client(client: Arc<OgClient>) {
    *DEFAULT_CLIENT.write() = Some(client);
}

pub fn default_client() -> OgResult<Arc<OgClient>> {
    DEFAULT_CLIENT.read().clone().ok_or(Error::NotInitialized)
}

pub async fn infer(
    model_cid: &str,
    inference_mode: InferenceMode,
    model_input: ModelInput,
    max_retries: Option<u32>,
) -> OgResult<InferenceResult> {
    default_client()?
        .infer(model_cid, inference_mode, model_input, max_retries)
        .await
}

pub async fn llm_chat(
    request: LlmChatRequest,
    max_retries: Option<u32>,
) -> OgResult<TextGenerationOutput> {
    default_client()?.llm_chat(request, max_retries).await
}

pub async fn llm_completion(
    request: LlmCompletionRequest,
    max_retries: Option<u32>,
) -> OgResult<TextGenerationOutput> {
    default_client()?.llm_completion(request, max_retries).await
}
