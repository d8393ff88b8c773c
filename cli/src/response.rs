// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Debug, Display, Formatter};

use serde::Serialize;
use tracing::info;
use types::base::{Address, TransactionHash};
use types::inference::{InferenceResult, TextGenerationOutput};
use types::tensor::ModelOutput;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOutput {
    pub contract_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_until: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressOutput {
    pub address: Address,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOutput {
    pub path: String,
    #[serde(skip)]
    pub summary: String,
    pub active_env: Option<String>,
    pub envs: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Inference(InferenceResult),
    TextGeneration(TextGenerationOutput),
    Workflow(WorkflowOutput),
    WorkflowResult(ModelOutput),
    WorkflowHistory(Vec<ModelOutput>),
    Address(AddressOutput),
    Config(ConfigOutput),
    ChainId {
        alias: String,
        #[serde(rename = "chainId")]
        chain_id: u64,
    },
}

impl CommandOutput {
    pub fn transaction_hash(&self) -> Option<TransactionHash> {
        match self {
            CommandOutput::Inference(result) => Some(result.transaction_hash),
            CommandOutput::TextGeneration(output) => Some(output.transaction_hash),
            _ => None,
        }
    }

    pub fn print(&self, pretty: bool) {
        let line = if pretty {
            format!("{self}")
        } else {
            format!("{:?}", self)
        };
        for line in line.lines() {
            println!("{line}");
        }
        if let Some(hash) = self.transaction_hash() {
            info!("Transaction {:?}", hash);
        }
    }
}

impl Display for CommandOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandOutput::Config(config) => {
                writeln!(f, "Config: {}", config.path)?;
                write!(f, "{}", config.summary)
            }
            _ => match serde_json::to_string_pretty(self) {
                Ok(json) => write!(f, "{json}"),
                Err(err) => write!(f, "Error serializing JSON: {err}"),
            },
        }
    }
}

// when --json flag is used, any output result is transformed into a compact JSON string
impl Debug for CommandOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{json}"),
            Err(err) => write!(f, "Error serializing JSON: {err}"),
        }
    }
}
