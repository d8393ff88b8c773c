// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use clap::Subcommand;

use crate::client_commands::{ClientCommand, ClientOpts};
use crate::config_commands::ConfigCommand;

#[allow(clippy::large_enum_variant)]
#[derive(Subcommand, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum OgCommand {
    #[clap(flatten)]
    Client(ClientCommand),
    /// Manage client environments
    #[clap(name = "config")]
    Config {
        /// Subcommands.
        #[clap(subcommand)]
        cmd: ConfigCommand,
    },
}

impl OgCommand {
    pub async fn execute(self, opts: &ClientOpts) -> Result<(), anyhow::Error> {
        let output = match self {
            OgCommand::Client(cmd) => cmd.execute(opts).await?,
            OgCommand::Config { cmd } => cmd.execute(opts).await?,
        };
        output.print(!opts.json);
        Ok(())
    }
}
