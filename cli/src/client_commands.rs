// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use sdk::client_config::{OgClientConfig, OgEnv};
use sdk::OgClient;
use serde::de::DeserializeOwned;
use tracing::debug;
use types::base::{decode_hex, parse_address, Address};
use types::config::{default_client_config_path, Config};
use types::crypto::Wallet;
use types::inference::{
    ChatMessage, InferenceMode, Llm, LlmChatRequest, LlmCompletionRequest, LlmInferenceMode,
    ToolDefinition,
};
use types::tensor::ModelInput;
use types::workflow::{HistoricalInputQuery, SchedulerParams};

use crate::error::{CliError, CliResult};
use crate::response::{AddressOutput, CommandOutput, WorkflowOutput};

/// Options shared by every command that talks to the network.
#[derive(Args, Debug, Clone, Default)]
#[clap(rename_all = "kebab-case")]
pub struct ClientOpts {
    /// Hex-encoded private key of the signing account
    #[clap(long, env = "OG_PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<String>,
    /// Client config file
    #[clap(long, env = "OG_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// Environment alias to use instead of the active one
    #[clap(long, global = true)]
    pub env: Option<String>,
    /// Override the environment's RPC endpoint
    #[clap(long, global = true)]
    pub rpc_url: Option<String>,
    /// Print compact JSON
    #[clap(long, global = true)]
    pub json: bool,
}

impl ClientOpts {
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => default_client_config_path(),
        }
    }

    /// The saved config, or the built-in environments when none was saved.
    pub fn load_config(&self) -> anyhow::Result<OgClientConfig> {
        let path = self.config_path()?;
        if path.exists() {
            OgClientConfig::load(&path)
        } else {
            debug!("No config at {}, using default environments", path.display());
            Ok(OgClientConfig::with_default_envs())
        }
    }

    pub fn select_env(&self, config: &OgClientConfig) -> CliResult<OgEnv> {
        let alias = self.env.clone().or_else(|| config.active_env.clone());
        let mut env = config
            .get_env(&alias)
            .cloned()
            .ok_or_else(|| {
                CliError::EnvError(format!(
                    "Environment [{}] not found",
                    alias.as_deref().unwrap_or("None")
                ))
            })?;
        if let Some(rpc_url) = &self.rpc_url {
            env.rpc = rpc_url.clone();
        }
        Ok(env)
    }

    pub fn private_key(&self) -> CliResult<&str> {
        self.private_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(CliError::MissingPrivateKey)
    }

    pub fn client(&self) -> anyhow::Result<OgClient> {
        let config = self.load_config()?;
        let env = self.select_env(&config)?;
        Ok(OgClient::builder().build(self.private_key()?, &env)?)
    }
}

#[derive(Subcommand, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Run an ML model on chain
    Infer {
        /// Model CID
        #[clap(long)]
        model: String,
        /// VANILLA, ZKML or TEE
        #[clap(long, default_value = "vanilla")]
        mode: InferenceMode,
        /// Model input as a JSON object of arrays
        #[clap(long, conflicts_with = "input_file")]
        input: Option<String>,
        #[clap(long)]
        input_file: Option<PathBuf>,
        #[clap(long)]
        max_retries: Option<u32>,
    },
    /// Chat with a hosted LLM
    Chat {
        #[clap(long)]
        model: Llm,
        /// Messages as a JSON array of {role, content}
        #[clap(long, conflicts_with = "messages_file")]
        messages: Option<String>,
        #[clap(long)]
        messages_file: Option<PathBuf>,
        #[clap(long, default_value_t = 100)]
        max_tokens: u32,
        #[clap(long, default_value_t = 0.0)]
        temperature: f64,
        #[clap(long)]
        stop_sequence: Vec<String>,
        /// Tool definitions as a JSON array of {name, description, parameters}
        #[clap(long)]
        tools: Option<String>,
        #[clap(long, default_value = "")]
        tool_choice: String,
        #[clap(long, default_value = "vanilla")]
        mode: LlmInferenceMode,
        #[clap(long)]
        max_retries: Option<u32>,
    },
    /// Complete a prompt with a hosted LLM
    Completion {
        #[clap(long)]
        model: Llm,
        #[clap(long)]
        prompt: String,
        #[clap(long, default_value_t = 100)]
        max_tokens: u32,
        #[clap(long, default_value_t = 0.0)]
        temperature: f64,
        #[clap(long)]
        stop_sequence: Vec<String>,
        #[clap(long, default_value = "vanilla")]
        mode: LlmInferenceMode,
        #[clap(long)]
        max_retries: Option<u32>,
    },
    /// Deploy a workflow contract that runs a model over price history
    NewWorkflow {
        #[clap(long)]
        model: String,
        /// Name of the model input tensor fed with the candles
        #[clap(long)]
        input_name: String,
        /// Candle query as JSON, e.g. {"base":"ETH","quote":"USD",...}
        #[clap(long)]
        query: String,
        /// Compiled workflow contract, hex or raw bytes
        #[clap(long)]
        bytecode_file: PathBuf,
        /// Seconds between scheduled runs
        #[clap(long, requires = "duration_hours")]
        frequency: Option<u64>,
        #[clap(long, requires = "frequency")]
        duration_hours: Option<u64>,
    },
    /// Read the latest result of a workflow contract
    ReadWorkflow {
        #[clap(value_parser = parse_address)]
        address: Address,
    },
    /// Read the most recent results of a workflow contract
    WorkflowHistory {
        #[clap(value_parser = parse_address)]
        address: Address,
        #[clap(long, default_value_t = 1)]
        num_results: u64,
    },
    /// Print the address of the signing account
    Address,
}

impl ClientCommand {
    pub async fn execute(self, opts: &ClientOpts) -> anyhow::Result<CommandOutput> {
        Ok(match self {
            ClientCommand::Address => {
                let wallet = Wallet::from_private_key(opts.private_key()?)
                    .map_err(|e| CliError::InvalidInput(e.to_string()))?;
                CommandOutput::Address(AddressOutput {
                    address: wallet.address(),
                })
            }
            ClientCommand::Infer {
                model,
                mode,
                input,
                input_file,
                max_retries,
            } => {
                let input: serde_json::Value =
                    read_json_arg(input, input_file.as_deref(), "--input")?;
                let model_input = ModelInput::from_json(&input)
                    .map_err(|e| CliError::InvalidInput(e.to_string()))?;
                let client = opts.client()?;
                CommandOutput::Inference(client.infer(&model, mode, model_input, max_retries).await?)
            }
            ClientCommand::Chat {
                model,
                messages,
                messages_file,
                max_tokens,
                temperature,
                stop_sequence,
                tools,
                tool_choice,
                mode,
                max_retries,
            } => {
                let messages: Vec<ChatMessage> =
                    read_json_arg(messages, messages_file.as_deref(), "--messages")?;
                let tools: Vec<ToolDefinition> = match tools {
                    Some(tools) => parse_json(&tools, "--tools")?,
                    None => vec![],
                };
                let request = LlmChatRequest::new(model, messages)
                    .with_mode(mode)
                    .with_max_tokens(max_tokens)
                    .with_temperature(temperature)
                    .with_stop_sequence(stop_sequence)
                    .with_tools(tools, tool_choice);
                let client = opts.client()?;
                CommandOutput::TextGeneration(client.llm_chat(request, max_retries).await?)
            }
            ClientCommand::Completion {
                model,
                prompt,
                max_tokens,
                temperature,
                stop_sequence,
                mode,
                max_retries,
            } => {
                let request = LlmCompletionRequest::new(model, prompt)
                    .with_mode(mode)
                    .with_max_tokens(max_tokens)
                    .with_temperature(temperature)
                    .with_stop_sequence(stop_sequence);
                let client = opts.client()?;
                CommandOutput::TextGeneration(client.llm_completion(request, max_retries).await?)
            }
            ClientCommand::NewWorkflow {
                model,
                input_name,
                query,
                bytecode_file,
                frequency,
                duration_hours,
            } => {
                let query: HistoricalInputQuery = parse_json(&query, "--query")?;
                let bytecode = read_bytecode(&bytecode_file)?;
                let scheduler_params = frequency
                    .zip(duration_hours)
                    .map(|(frequency, hours)| SchedulerParams::new(frequency, hours));
                let client = opts.client()?;
                let contract_address = client
                    .new_workflow(&model, &query, &input_name, scheduler_params, &bytecode)
                    .await?;
                CommandOutput::Workflow(WorkflowOutput {
                    contract_address,
                    scheduled_until: scheduler_params.map(|p| p.end_time),
                })
            }
            ClientCommand::ReadWorkflow { address } => {
                let client = opts.client()?;
                CommandOutput::WorkflowResult(client.read_workflow_result(address).await?)
            }
            ClientCommand::WorkflowHistory {
                address,
                num_results,
            } => {
                let client = opts.client()?;
                CommandOutput::WorkflowHistory(
                    client.read_workflow_history(address, num_results).await?,
                )
            }
        })
    }
}

pub fn parse_json<T: DeserializeOwned>(raw: &str, arg: &str) -> CliResult<T> {
    serde_json::from_str(raw).map_err(|e| CliError::InvalidInput(format!("{arg}: {e}")))
}

/// JSON given inline or in a file; exactly one of the two is required.
pub fn read_json_arg<T: DeserializeOwned>(
    inline: Option<String>,
    file: Option<&Path>,
    arg: &str,
) -> CliResult<T> {
    match (inline, file) {
        (Some(raw), _) => parse_json(&raw, arg),
        (None, Some(path)) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                CliError::InvalidInput(format!("{arg}: cannot read {}: {e}", path.display()))
            })?;
            parse_json(&raw, arg)
        }
        (None, None) => Err(CliError::InvalidInput(format!(
            "{arg} or {arg}-file is required"
        ))),
    }
}

/// Bytecode files hold either hex text (as emitted by solc) or raw bytes.
pub fn read_bytecode(path: &Path) -> CliResult<Vec<u8>> {
    let bytes = std::fs::read(path).map_err(|e| {
        CliError::InvalidInput(format!("cannot read {}: {e}", path.display()))
    })?;
    let hex_bytes = std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| decode_hex(text.trim()).ok());
    Ok(hex_bytes.unwrap_or(bytes))
}
