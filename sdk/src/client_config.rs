// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter, Write};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use types::base::{parse_address, Address};
use types::config::Config;

use crate::{
    DEFAULT_INFERENCE_CONTRACT_ADDRESS, DEFAULT_RPC_URL, DEFAULT_SCHEDULER_ADDRESS,
    LOCAL_NETWORK_URL,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OgClientConfig {
    /// List of environments that the client can connect to.
    pub envs: Vec<OgEnv>,
    /// The alias of the currently active environment.
    pub active_env: Option<String>,
}

impl OgClientConfig {
    /// Config with the devnet and localnet presets, devnet active.
    pub fn with_default_envs() -> Self {
        Self {
            envs: vec![OgEnv::devnet(), OgEnv::localnet()],
            active_env: Some("devnet".to_string()),
        }
    }

    pub fn get_env(&self, alias: &Option<String>) -> Option<&OgEnv> {
        if let Some(alias) = alias {
            self.envs.iter().find(|env| &env.alias == alias)
        } else {
            self.envs.first()
        }
    }

    pub fn get_active_env(&self) -> Result<&OgEnv, anyhow::Error> {
        self.get_env(&self.active_env).ok_or_else(|| {
            anyhow!(
                "Environment configuration not found for env [{}]",
                self.active_env.as_deref().unwrap_or("None")
            )
        })
    }

    /// Adds `env` unless an environment with the same alias exists.
    pub fn add_env(&mut self, env: OgEnv) {
        if !self
            .envs
            .iter()
            .any(|other_env| other_env.alias == env.alias)
        {
            self.envs.push(env)
        }
    }

    pub fn switch_env(&mut self, alias: &str) -> Result<(), anyhow::Error> {
        if !self.envs.iter().any(|env| env.alias == alias) {
            return Err(anyhow!("Environment {} not found", alias));
        }
        self.active_env = Some(alias.to_string());
        Ok(())
    }

    /// Update the cached chain ID for the specified environment.
    pub fn update_env_chain_id(&mut self, alias: &str, chain_id: u64) -> Result<(), anyhow::Error> {
        let env = self
            .envs
            .iter_mut()
            .find(|env| env.alias == alias)
            .ok_or_else(|| anyhow!("Environment {} not found", alias))?;
        env.chain_id = Some(chain_id);
        Ok(())
    }
}

impl Config for OgClientConfig {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OgEnv {
    pub alias: String,
    /// JSON-RPC endpoint of the OpenGradient node.
    pub rpc: String,
    pub inference_contract: Address,
    pub scheduler_contract: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl OgEnv {
    pub fn new(
        alias: impl Into<String>,
        rpc: impl Into<String>,
        inference_contract: Address,
        scheduler_contract: Address,
    ) -> Self {
        Self {
            alias: alias.into(),
            rpc: rpc.into(),
            inference_contract,
            scheduler_contract,
            chain_id: None,
        }
    }

    pub fn devnet() -> Self {
        Self::new(
            "devnet",
            DEFAULT_RPC_URL,
            default_address(DEFAULT_INFERENCE_CONTRACT_ADDRESS),
            default_address(DEFAULT_SCHEDULER_ADDRESS),
        )
    }

    /// A local node with the contracts deployed at the devnet addresses.
    pub fn localnet() -> Self {
        Self::new(
            "local",
            LOCAL_NETWORK_URL,
            default_address(DEFAULT_INFERENCE_CONTRACT_ADDRESS),
            default_address(DEFAULT_SCHEDULER_ADDRESS),
        )
    }
}

fn default_address(s: &str) -> Address {
    parse_address(s).unwrap_or_default()
}

impl Display for OgEnv {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut writer = String::new();
        writeln!(writer, "Active environment : {}", self.alias)?;
        writeln!(writer, "RPC URL: {}", self.rpc)?;
        writeln!(writer, "Inference contract: {:?}", self.inference_contract)?;
        write!(writer, "Scheduler contract: {:?}", self.scheduler_contract)?;
        if let Some(chain_id) = &self.chain_id {
            writeln!(writer)?;
            write!(writer, "Chain ID: {}", chain_id)?;
        }
        write!(f, "{}", writer)
    }
}

impl Display for OgClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut writer = String::new();

        writeln!(writer, "Environments : {}", self.envs.len())?;
        for env in &self.envs {
            writeln!(writer, "  {} ({})", env.alias, env.rpc)?;
        }
        if let Ok(env) = self.get_active_env() {
            write!(writer, "{}", env)?;
        }
        write!(f, "{}", writer)
    }
}
