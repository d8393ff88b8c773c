// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while converting between floats, tensors and their on-chain form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("Value {0} is not a finite number")]
    NonFinite(f64),
    #[error("Value {value} scaled by 10^{decimals} does not fit in int128")]
    Overflow { value: f64, decimals: i128 },
    #[error("Decimal shift {0} is out of range")]
    DecimalsOutOfRange(i128),
    #[error("Invalid JSON in tensor [{name}]: {reason}")]
    InvalidJson { name: String, reason: String },
    #[error("Invalid model input: {0}")]
    InvalidInput(String),
    #[error("Temperature {0} must be a finite, non-negative number")]
    InvalidTemperature(f64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Read of {len} bytes at offset {offset} exceeds data length {data_len}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        data_len: usize,
    },
    #[error("Invalid ABI data: {0}")]
    InvalidData(String),
    #[error("Expected {expected} token, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("Expected {expected} values, found {found}")]
    WrongArity { expected: usize, found: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}
