// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use types::inference::{ChatMessage, Llm, LlmChatRequest, LlmInferenceMode};

use crate::error::{Error, OgResult};
use crate::OgClient;

pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 300;

/// Chat model backed by on-chain LLM inference, shaped for agent
/// frameworks that exchange plain role/content messages.
#[derive(Clone)]
pub struct OgChatModel {
    client: OgClient,
    model_cid: Llm,
    max_tokens: u32,
}

impl OgChatModel {
    /// Chat model on a devnet client for `private_key`.
    pub fn new(private_key: &str, model_cid: Llm, max_tokens: Option<u32>) -> OgResult<Self> {
        let client = OgClient::new(private_key, None, None)?;
        Ok(Self::from_client(client, model_cid, max_tokens))
    }

    pub fn from_client(client: OgClient, model_cid: Llm, max_tokens: Option<u32>) -> Self {
        Self {
            client,
            model_cid,
            max_tokens: max_tokens.unwrap_or(DEFAULT_CHAT_MAX_TOKENS),
        }
    }

    pub fn model_cid(&self) -> Llm {
        self.model_cid
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Send the conversation and return the assistant's reply.
    pub async fn invoke(&self, messages: Vec<ChatMessage>) -> OgResult<ChatMessage> {
        let request = LlmChatRequest::new(self.model_cid, messages)
            .with_mode(LlmInferenceMode::Vanilla)
            .with_max_tokens(self.max_tokens);
        let response = self.client.llm_chat(request, None).await?;
        let reply = response.chat_output.ok_or(Error::MissingChatOutput)?;
        Ok(ChatMessage {
            role: reply.role,
            content: reply.content,
            tool_calls: reply.tool_calls,
            ..Default::default()
        })
    }
}

pub fn langchain_adapter(
    private_key: &str,
    model_cid: Llm,
    max_tokens: Option<u32>,
) -> OgResult<OgChatModel> {
    OgChatModel::new(private_key, model_cid, max_tokens)
}
