// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Subcommand;
use rpc::{EthApi, HttpRpcClient};
use sdk::client_config::{OgClientConfig, OgEnv};
use tracing::info;
use types::base::{parse_address, Address};
use types::config::{Config, PersistedConfig};

use crate::client_commands::ClientOpts;
use crate::response::{CommandOutput, ConfigOutput};

#[derive(Subcommand, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum ConfigCommand {
    /// Show the saved environments
    Show,
    /// Write a config with the default environments
    Init {
        /// Overwrite an existing config
        #[clap(long)]
        force: bool,
    },
    /// Add a new environment
    AddEnv {
        #[clap(long)]
        alias: String,
        #[clap(long)]
        rpc: String,
        #[clap(long, value_parser = parse_address)]
        inference_contract: Address,
        /// Defaults to the inference contract
        #[clap(long, value_parser = parse_address)]
        scheduler_contract: Option<Address>,
        #[clap(long)]
        chain_id: Option<u64>,
    },
    /// Make an environment the active one
    Switch { alias: String },
    /// Query the node for its chain id and cache it in the environment
    ChainId,
}

impl ConfigCommand {
    pub async fn execute(self, opts: &ClientOpts) -> anyhow::Result<CommandOutput> {
        let path = opts.config_path()?;
        match self {
            ConfigCommand::Show => {
                let config = opts.load_config()?;
                Ok(config_output(&path, &config))
            }
            ConfigCommand::Init { force } => {
                if path.exists() && !force {
                    return Err(anyhow!(
                        "Config already exists at {}; pass --force to overwrite",
                        path.display()
                    ));
                }
                let config = OgClientConfig::with_default_envs();
                config.save(&path)?;
                info!("Wrote client config to {}", path.display());
                Ok(config_output(&path, &config))
            }
            ConfigCommand::AddEnv {
                alias,
                rpc,
                inference_contract,
                scheduler_contract,
                chain_id,
            } => {
                let mut config =
                    PersistedConfig::load_or(&path, OgClientConfig::with_default_envs)?;
                if config.get_env(&Some(alias.clone())).is_some() {
                    return Err(anyhow!("Environment {} already exists", alias));
                }
                let mut env = OgEnv::new(
                    alias,
                    rpc,
                    inference_contract,
                    scheduler_contract.unwrap_or(inference_contract),
                );
                env.chain_id = chain_id;
                config.add_env(env);
                config.save()?;
                Ok(config_output(&path, &config))
            }
            ConfigCommand::Switch { alias } => {
                let mut config =
                    PersistedConfig::load_or(&path, OgClientConfig::with_default_envs)?;
                config.switch_env(&alias)?;
                config.save()?;
                Ok(config_output(&path, &config))
            }
            ConfigCommand::ChainId => {
                let mut config =
                    PersistedConfig::load_or(&path, OgClientConfig::with_default_envs)?;
                let env = opts.select_env(&config)?;
                let node = HttpRpcClient::new(&env.rpc, Duration::from_secs(30))?;
                let chain_id = node
                    .chain_id()
                    .await
                    .with_context(|| format!("Cannot reach {}", env.rpc))?;
                config.update_env_chain_id(&env.alias, chain_id)?;
                config.save()?;
                Ok(CommandOutput::ChainId {
                    alias: env.alias,
                    chain_id,
                })
            }
        }
    }
}

fn config_output(path: &std::path::Path, config: &OgClientConfig) -> CommandOutput {
    CommandOutput::Config(ConfigOutput {
        path: path.display().to_string(),
        summary: config.to_string(),
        active_env: config.active_env.clone(),
        envs: config.envs.iter().map(|env| env.alias.clone()).collect(),
    })
}

