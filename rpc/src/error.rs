// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub type RpcResult<T> = Result<T, RpcError>;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Node returned HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// An error object returned by the node, e.g. a revert or a nonce rejection.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },
    #[error("Invalid JSON-RPC response: {0}")]
    InvalidResponse(String),
    #[error("Invalid RPC url: {0}")]
    InvalidUrl(String),
}

impl RpcError {
    /// Whether the node rejected a transaction because of its nonce. These
    /// clear up once the transaction is rebuilt with a fresh nonce.
    pub fn is_nonce_error(&self) -> bool {
        match self {
            RpcError::JsonRpc { message, .. } => {
                let message = message.to_ascii_lowercase();
                message.contains("nonce too low")
                    || message.contains("nonce too high")
                    || message.contains("replacement transaction underpriced")
                    || message.contains("already known")
            }
            _ => false,
        }
    }
}
