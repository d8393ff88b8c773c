// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types shared by the OpenGradient client crates.
//!
//! Nothing in this crate performs I/O: it defines the tensor encoding used by
//! the inference contracts, the Solidity ABI codec those tensors travel
//! through, legacy transaction encoding and the signing key wrapper.

pub mod abi;
pub mod base;
pub mod config;
pub mod contracts;
pub mod crypto;
pub mod error;
pub mod inference;
pub mod number;
pub mod tensor;
pub mod transaction;
pub mod workflow;
