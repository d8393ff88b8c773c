// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use clap::*;
use cli::client_commands::ClientOpts;
use cli::commands::OgCommand;
use colored::Colorize;
use tracing::debug;

const VERSION: &str = env!("CARGO_PKG_VERSION");

macro_rules! exit_main {
    ($result:expr) => {
        match $result {
            Ok(_) => (),
            Err(err) => {
                let err = format!("{:?}", err);
                eprintln!("{}", err.bold().red());
                std::process::exit(1);
            }
        }
    };
}

#[derive(Parser)]
#[clap(
    name = env!("CARGO_BIN_NAME"),
    about = "Verifiable ML and LLM inference on the OpenGradient network",
    rename_all = "kebab-case",
    author,
    version = VERSION,
    propagate_version = true,
)]
struct Args {
    #[clap(flatten)]
    opts: ClientOpts,
    #[clap(subcommand)]
    command: OgCommand,
}

#[tokio::main]
async fn main() {
    #[cfg(windows)]
    let _ = colored::control::set_virtual_terminal(true);

    utils::logging::init_logging(utils::logging::DEFAULT_FILTER);
    let args = Args::parse();
    debug!("OpenGradient CLI version: {VERSION}");
    exit_main!(args.command.execute(&args.opts).await);
}
