// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

pub use rpc::RpcError;
use thiserror::Error;
use types::base::TransactionHash;
use types::error::{AbiError, KeyError, TensorError};

pub type OgResult<T = ()> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    RpcError(#[from] RpcError),
    #[error("ABI error: {0}")]
    AbiError(#[from] AbiError),
    #[error("Tensor error: {0}")]
    TensorError(#[from] TensorError),
    #[error("Key error: {0}")]
    KeyError(#[from] KeyError),
    #[error("Error initializing client: {0}")]
    ClientInitError(String),
    #[error("Failed to confirm tx status for {0:?} within {1} seconds.")]
    ConfirmationTimeout(TransactionHash, u64),
    #[error("Transaction {0:?} reverted")]
    TransactionReverted(TransactionHash),
    #[error("No {event} event found in transaction {transaction:?}")]
    EventNotFound {
        event: String,
        transaction: TransactionHash,
    },
    #[error("Deployment {0:?} did not create a contract")]
    MissingContractAddress(TransactionHash),
    #[error("Workflow contract bytecode is empty")]
    MissingWorkflowBytecode,
    #[error("Contract call returned no data")]
    EmptyCallResult,
    #[error("OpenGradient client not initialized. Call init() first.")]
    NotInitialized,
    #[error("No chat output received")]
    MissingChatOutput,
    #[error("{0} environment variable is not set")]
    MissingEnvVar(String),
    #[error("Chain id mismatch: environment expects {expected}, node reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },
}
