// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No private key given; pass --private-key or set OG_PRIVATE_KEY")]
    MissingPrivateKey,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Environment error: {0}")]
    EnvError(String),
}

pub type CliResult<T> = Result<T, CliError>;
