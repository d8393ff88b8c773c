// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::error::KeyError;

pub use ethereum_types::{Address, H256, U256};

/// Hash of a signed transaction.
pub type TransactionHash = H256;

/// Parse a 20-byte hex address, with or without the `0x` prefix.
pub fn parse_address(s: &str) -> Result<Address, KeyError> {
    let bytes = decode_hex(s).map_err(|e| KeyError::InvalidAddress(format!("{s}: {e}")))?;
    if bytes.len() != Address::len_bytes() {
        return Err(KeyError::InvalidAddress(format!(
            "{s} has {} bytes, expected 20",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

/// Full lowercase `0x`-prefixed hex form. `Display` on fixed hashes abbreviates.
pub fn format_address(address: &Address) -> String {
    format!("{address:?}")
}

pub fn format_hash(hash: &H256) -> String {
    format!("{hash:?}")
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s.trim().trim_start_matches("0x"))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
