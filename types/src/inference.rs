// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::abi::{ParamType, Token, Tokenizable};
use crate::base::TransactionHash;
use crate::error::{AbiError, TensorError};

/// How a classical model run is executed and attested.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum InferenceMode {
    #[default]
    Vanilla = 0,
    Zkml = 1,
    Tee = 2,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum LlmInferenceMode {
    #[default]
    Vanilla = 0,
    Tee = 1,
}

impl Tokenizable for InferenceMode {
    fn into_token(self) -> Token {
        Token::uint(self as u8)
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token.into_u64()? {
            0 => Ok(InferenceMode::Vanilla),
            1 => Ok(InferenceMode::Zkml),
            2 => Ok(InferenceMode::Tee),
            other => Err(AbiError::InvalidData(format!("unknown inference mode {other}"))),
        }
    }
}

impl Tokenizable for LlmInferenceMode {
    fn into_token(self) -> Token {
        Token::uint(self as u8)
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        match token.into_u64()? {
            0 => Ok(LlmInferenceMode::Vanilla),
            1 => Ok(LlmInferenceMode::Tee),
            other => Err(AbiError::InvalidData(format!("unknown LLM inference mode {other}"))),
        }
    }
}

/// Language models hosted on the network, identified by their model CID.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Llm {
    #[strum(serialize = "meta-llama/Meta-Llama-3-8B-Instruct")]
    #[serde(rename = "meta-llama/Meta-Llama-3-8B-Instruct")]
    MetaLlama3_8bInstruct,
    #[strum(serialize = "meta-llama/Llama-3.2-3B-Instruct")]
    #[serde(rename = "meta-llama/Llama-3.2-3B-Instruct")]
    Llama3_2_3bInstruct,
    #[strum(serialize = "Qwen/Qwen2.5-72B-Instruct")]
    #[serde(rename = "Qwen/Qwen2.5-72B-Instruct")]
    Qwen2_5_72bInstruct,
    #[strum(serialize = "meta-llama/Llama-3.1-70B-Instruct")]
    #[serde(rename = "meta-llama/Llama-3.1-70B-Instruct")]
    MetaLlama3_1_70bInstruct,
    #[strum(serialize = "SentientAGI/Dobby-Mini-Unhinged-Llama-3.1-8B")]
    #[serde(rename = "SentientAGI/Dobby-Mini-Unhinged-Llama-3.1-8B")]
    DobbyUnhinged3_1_8b,
    #[strum(serialize = "SentientAGI/Dobby-Mini-Leashed-Llama-3.1-8B")]
    #[serde(rename = "SentientAGI/Dobby-Mini-Leashed-Llama-3.1-8B")]
    DobbyLeashed3_1_8b,
}

impl Llm {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Models available for TEE-attested LLM inference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
pub enum TeeLlm {
    #[strum(serialize = "meta-llama/Llama-3.1-70B-Instruct")]
    #[serde(rename = "meta-llama/Llama-3.1-70B-Instruct")]
    MetaLlama3_1_70bInstruct,
}

impl TeeLlm {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl From<TeeLlm> for Llm {
    fn from(model: TeeLlm) -> Self {
        match model {
            TeeLlm::MetaLlama3_1_70bInstruct => Llm::MetaLlama3_1_70bInstruct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    pub transaction_hash: TransactionHash,
    pub model_output: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl Tokenizable for ToolCall {
    fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::String(self.id),
            Token::String(self.name),
            Token::String(self.arguments),
        ])
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let [id, name, arguments] = token.into_fixed_tuple::<3>()?;
        Ok(Self {
            id: id.into_string()?,
            name: name.into_string()?,
            arguments: arguments.into_string()?,
        })
    }
}

/// One chat turn. Empty strings stand for absent optional fields on chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tool_call_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

impl Tokenizable for ChatMessage {
    fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::String(self.role),
            Token::String(self.content),
            Token::String(self.name),
            Token::String(self.tool_call_id),
            self.tool_calls.into_token(),
        ])
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let [role, content, name, tool_call_id, tool_calls] = token.into_fixed_tuple::<5>()?;
        Ok(Self {
            role: role.into_string()?,
            content: content.into_string()?,
            name: name.into_string()?,
            tool_call_id: tool_call_id.into_string()?,
            tool_calls: Vec::from_token(tool_calls)?,
        })
    }
}

/// A function the model may call. `parameters` is a JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    fn into_abi_token(self) -> Token {
        let parameters = if self.parameters.is_null() {
            String::new()
        } else {
            self.parameters.to_string()
        };
        Token::Tuple(vec![
            Token::String(self.name),
            Token::String(self.description),
            Token::String(parameters),
        ])
    }
}

/// Sampling temperature as carried on chain: hundredths in a `uint32`.
pub fn temperature_to_chain(temperature: f64) -> Result<u32, TensorError> {
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(TensorError::InvalidTemperature(temperature));
    }
    let scaled = (temperature * 100.0).round();
    if scaled > f64::from(u32::MAX) {
        return Err(TensorError::InvalidTemperature(temperature));
    }
    Ok(scaled as u32)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmChatRequest {
    pub mode: LlmInferenceMode,
    pub model_cid: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: String,
    pub max_tokens: u32,
    pub stop_sequence: Vec<String>,
    pub temperature: f64,
}

impl LlmChatRequest {
    pub fn new(model: Llm, messages: Vec<ChatMessage>) -> Self {
        Self {
            mode: LlmInferenceMode::Vanilla,
            model_cid: model.as_str().to_string(),
            messages,
            tools: vec![],
            tool_choice: String::new(),
            max_tokens: 100,
            stop_sequence: vec![],
            temperature: 0.0,
        }
    }

    pub fn with_mode(mut self, mode: LlmInferenceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_stop_sequence(mut self, stop_sequence: Vec<String>) -> Self {
        self.stop_sequence = stop_sequence;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>, tool_choice: impl Into<String>) -> Self {
        self.tools = tools;
        self.tool_choice = tool_choice.into();
        self
    }

    pub fn try_into_token(self) -> Result<Token, TensorError> {
        let temperature = temperature_to_chain(self.temperature)?;
        Ok(Token::Tuple(vec![
            self.mode.into_token(),
            Token::String(self.model_cid),
            self.messages.into_token(),
            Token::Array(self.tools.into_iter().map(ToolDefinition::into_abi_token).collect()),
            Token::String(self.tool_choice),
            Token::uint(self.max_tokens),
            self.stop_sequence.into_token(),
            Token::uint(temperature),
        ]))
    }

    pub fn abi_type() -> ParamType {
        ParamType::Tuple(vec![
            ParamType::Uint(8),
            ParamType::String,
            ParamType::array(chat_message_type()),
            ParamType::array(ParamType::Tuple(vec![
                ParamType::String,
                ParamType::String,
                ParamType::String,
            ])),
            ParamType::String,
            ParamType::Uint(32),
            ParamType::array(ParamType::String),
            ParamType::Uint(32),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmCompletionRequest {
    pub mode: LlmInferenceMode,
    pub model_cid: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub stop_sequence: Vec<String>,
    pub temperature: f64,
}

impl LlmCompletionRequest {
    pub fn new(model: Llm, prompt: impl Into<String>) -> Self {
        Self {
            mode: LlmInferenceMode::Vanilla,
            model_cid: model.as_str().to_string(),
            prompt: prompt.into(),
            max_tokens: 100,
            stop_sequence: vec![],
            temperature: 0.0,
        }
    }

    pub fn with_mode(mut self, mode: LlmInferenceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_stop_sequence(mut self, stop_sequence: Vec<String>) -> Self {
        self.stop_sequence = stop_sequence;
        self
    }

    pub fn try_into_token(self) -> Result<Token, TensorError> {
        let temperature = temperature_to_chain(self.temperature)?;
        Ok(Token::Tuple(vec![
            self.mode.into_token(),
            Token::String(self.model_cid),
            Token::String(self.prompt),
            Token::uint(self.max_tokens),
            self.stop_sequence.into_token(),
            Token::uint(temperature),
        ]))
    }

    pub fn abi_type() -> ParamType {
        ParamType::Tuple(vec![
            ParamType::Uint(8),
            ParamType::String,
            ParamType::String,
            ParamType::Uint(32),
            ParamType::array(ParamType::String),
            ParamType::Uint(32),
        ])
    }
}

pub fn chat_message_type() -> ParamType {
    ParamType::Tuple(vec![
        ParamType::String,
        ParamType::String,
        ParamType::String,
        ParamType::String,
        ParamType::array(ParamType::Tuple(vec![
            ParamType::String,
            ParamType::String,
            ParamType::String,
        ])),
    ])
}

/// `(string finish_reason, ChatMessage message)`
pub fn chat_response_type() -> ParamType {
    ParamType::Tuple(vec![ParamType::String, chat_message_type()])
}

/// `(string answer)`
pub fn completion_response_type() -> ParamType {
    ParamType::Tuple(vec![ParamType::String])
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationOutput {
    pub transaction_hash: TransactionHash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_output: Option<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_output: Option<String>,
}

impl TextGenerationOutput {
    /// Decode an `LLMChatResult` response tuple.
    pub fn from_chat_response(
        transaction_hash: TransactionHash,
        response: Token,
    ) -> Result<Self, AbiError> {
        let [finish_reason, message] = response.into_fixed_tuple::<2>()?;
        Ok(Self {
            transaction_hash,
            finish_reason: Some(finish_reason.into_string()?),
            chat_output: Some(ChatMessage::from_token(message)?),
            completion_output: None,
        })
    }

    /// Decode an `LLMCompletionResult` response tuple.
    pub fn from_completion_response(
        transaction_hash: TransactionHash,
        response: Token,
    ) -> Result<Self, AbiError> {
        let [answer] = response.into_fixed_tuple::<1>()?;
        Ok(Self {
            transaction_hash,
            finish_reason: None,
            chat_output: None,
            completion_output: Some(answer.into_string()?),
        })
    }
}
