// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use ethereum_types::{Address, U256};
use rlp::RlpStream;

/// A pre-EIP-1559 transaction, signed with EIP-155 replay protection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyTransaction {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas: U256,
    /// `None` deploys a contract whose init code is `data`.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    fn append_fields(&self, s: &mut RlpStream) {
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas);
        match &self.to {
            Some(to) => {
                s.append(to);
            }
            None => {
                s.append_empty_data();
            }
        }
        s.append(&self.value);
        s.append(&self.data);
    }

    /// `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`, the bytes whose
    /// keccak256 hash is signed.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(9);
        self.append_fields(&mut s);
        s.append(&self.chain_id);
        s.append(&0u8);
        s.append(&0u8);
        s.out().to_vec()
    }

    /// Raw transaction bytes for `eth_sendRawTransaction`.
    pub fn encode_signed(&self, r: &[u8], s_bytes: &[u8], recovery_id: u8) -> Vec<u8> {
        let v = u64::from(recovery_id) + 35 + self.chain_id * 2;
        let mut s = RlpStream::new_list(9);
        self.append_fields(&mut s);
        s.append(&v);
        s.append(&U256::from_big_endian(r));
        s.append(&U256::from_big_endian(s_bytes));
        s.out().to_vec()
    }
}
