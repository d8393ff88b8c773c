// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Agent tools that expose on-chain models and workflow results to LLM
//! agent frameworks.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum_macros::{Display, EnumString};
use tracing::debug;
use types::base::Address;
use types::config::OG_PRIVATE_KEY_ENV;
use types::inference::{InferenceMode, ToolDefinition};
use types::tensor::{ModelInput, ModelOutput};

use crate::error::{Error, OgResult};
use crate::OgClient;

pub const DEFAULT_RUN_MODEL_DESCRIPTION: &str = "Executes the given ML model";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Langchain,
    Swarm,
}

pub type OutputFormatter = Arc<dyn Fn(&ModelOutput) -> String + Send + Sync>;
pub type InputGetter = Arc<dyn Fn() -> ModelInput + Send + Sync>;

/// Serializes the output as JSON.
pub fn default_formatter() -> OutputFormatter {
    Arc::new(|output: &ModelOutput| serde_json::to_string(output).unwrap_or_default())
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn tool_type(&self) -> ToolType;

    async fn invoke(&self, args: serde_json::Value) -> OgResult<String>;

    /// Function definition handed to a tool-calling LLM.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }
    }
}

/// Where a tool gets its client. Tools read `OG_PRIVATE_KEY` on every
/// invocation unless a client was pinned.
#[derive(Clone, Default)]
enum ClientSource {
    #[default]
    Env,
    Pinned(OgClient),
}

impl ClientSource {
    fn client(&self) -> OgResult<OgClient> {
        match self {
            ClientSource::Pinned(client) => Ok(client.clone()),
            ClientSource::Env => {
                let private_key = std::env::var(OG_PRIVATE_KEY_ENV)
                    .ok()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| Error::MissingEnvVar(OG_PRIVATE_KEY_ENV.to_string()))?;
                OgClient::new(&private_key, None, None)
            }
        }
    }
}

/// Reads the latest result of a deployed workflow contract.
pub struct ReadWorkflowTool {
    tool_type: ToolType,
    contract_address: Address,
    name: String,
    description: String,
    formatter: OutputFormatter,
    source: ClientSource,
}

impl ReadWorkflowTool {
    pub fn with_client(mut self, client: OgClient) -> Self {
        self.source = ClientSource::Pinned(client);
        self
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }
}

#[async_trait]
impl Tool for ReadWorkflowTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tool_type(&self) -> ToolType {
        self.tool_type
    }

    async fn invoke(&self, _args: serde_json::Value) -> OgResult<String> {
        debug!(tool = %self.name, "Reading workflow {:?}", self.contract_address);
        let client = self.source.client()?;
        let output = client.read_workflow_result(self.contract_address).await?;
        Ok((self.formatter)(&output))
    }
}

pub fn create_read_workflow_tool(
    tool_type: ToolType,
    contract_address: Address,
    name: impl Into<String>,
    description: impl Into<String>,
    formatter: Option<OutputFormatter>,
) -> ReadWorkflowTool {
    ReadWorkflowTool {
        tool_type,
        contract_address,
        name: name.into(),
        description: description.into(),
        formatter: formatter.unwrap_or_else(default_formatter),
        source: ClientSource::Env,
    }
}

/// Runs a model on fresh input from `input_getter` on every invocation.
pub struct RunModelTool {
    tool_type: ToolType,
    model_cid: String,
    name: String,
    description: String,
    input_getter: InputGetter,
    formatter: OutputFormatter,
    source: ClientSource,
}

impl RunModelTool {
    pub fn with_client(mut self, client: OgClient) -> Self {
        self.source = ClientSource::Pinned(client);
        self
    }

    pub fn model_cid(&self) -> &str {
        &self.model_cid
    }
}

#[async_trait]
impl Tool for RunModelTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tool_type(&self) -> ToolType {
        self.tool_type
    }

    async fn invoke(&self, _args: serde_json::Value) -> OgResult<String> {
        debug!(tool = %self.name, model_cid = %self.model_cid, "Running model tool");
        let client = self.source.client()?;
        let model_input = (self.input_getter)();
        let result = client
            .infer(&self.model_cid, InferenceMode::Vanilla, model_input, None)
            .await?;
        let output = ModelOutput {
            numbers: result.model_output,
            is_simulation_result: false,
            ..Default::default()
        };
        Ok((self.formatter)(&output))
    }
}

pub fn create_run_model_tool(
    tool_type: ToolType,
    model_cid: impl Into<String>,
    name: impl Into<String>,
    input_getter: InputGetter,
    formatter: Option<OutputFormatter>,
    description: Option<String>,
) -> RunModelTool {
    RunModelTool {
        tool_type,
        model_cid: model_cid.into(),
        name: name.into(),
        description: description.unwrap_or_else(|| DEFAULT_RUN_MODEL_DESCRIPTION.to_string()),
        input_getter,
        formatter: formatter.unwrap_or_else(default_formatter),
        source: ClientSource::Env,
    }
}
