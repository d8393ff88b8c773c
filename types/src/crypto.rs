// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use ethereum_types::Address;
use fastcrypto::hash::{HashFunction, Keccak256};
use fastcrypto::secp256k1::{Secp256k1KeyPair, Secp256k1PrivateKey};
use fastcrypto::traits::{KeyPair, RecoverableSigner, ToFromBytes};
use rand::{rngs::StdRng, SeedableRng};

use crate::base::{decode_hex, TransactionHash};
use crate::error::KeyError;
use crate::transaction::LegacyTransaction;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).digest
}

/// An externally owned account: a secp256k1 key pair and the address derived from it.
pub struct Wallet {
    inner: Secp256k1KeyPair,
    address: Address,
}

impl Wallet {
    pub fn generate() -> Self {
        Self::from_inner(Secp256k1KeyPair::generate(&mut StdRng::from_entropy()))
    }

    /// Load a 32-byte private key given as hex, with or without `0x`.
    pub fn from_private_key(private_key: &str) -> Result<Self, KeyError> {
        let bytes = decode_hex(private_key)
            .map_err(|e| KeyError::InvalidPrivateKey(format!("not hex: {e}")))?;
        let sk = Secp256k1PrivateKey::from_bytes(&bytes)
            .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_inner(Secp256k1KeyPair::from(sk)))
    }

    fn from_inner(inner: Secp256k1KeyPair) -> Self {
        let uncompressed = inner.public().pubkey.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        let address = Address::from_slice(&hash[12..]);
        Self { inner, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Hex encoding of the private key, without prefix.
    pub fn to_private_key(&self) -> String {
        hex::encode(self.inner.copy().private().as_bytes())
    }

    /// Sign with EIP-155 replay protection, returning the raw transaction and its hash.
    pub fn sign_transaction(
        &self,
        tx: &LegacyTransaction,
    ) -> Result<(Vec<u8>, TransactionHash), KeyError> {
        let payload = tx.signing_payload();
        let signature = self.inner.sign_recoverable_with_hash::<Keccak256>(&payload);
        let bytes: &[u8] = signature.as_ref();
        if bytes.len() != 65 || bytes[64] > 1 {
            return Err(KeyError::InvalidSignature(format!(
                "unexpected recoverable signature layout ({} bytes)",
                bytes.len()
            )));
        }
        let raw = tx.encode_signed(&bytes[..32], &bytes[32..64], bytes[64]);
        let hash = TransactionHash::from(keccak256(&raw));
        Ok((raw, hash))
    }
}

impl Clone for Wallet {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.copy(),
            address: self.address,
        }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::format_address;

    // First account of the well-known development mnemonic
    // "test test test ... junk".
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn derives_address_from_private_key() {
        let wallet = Wallet::from_private_key(DEV_KEY).unwrap();
        assert_eq!(format_address(&wallet.address()), DEV_ADDRESS);

        let unprefixed = Wallet::from_private_key(&DEV_KEY[2..]).unwrap();
        assert_eq!(unprefixed.address(), wallet.address());
        assert_eq!(format!("0x{}", wallet.to_private_key()), DEV_KEY);
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(Wallet::from_private_key("0x1234").is_err());
        assert!(Wallet::from_private_key("zz").is_err());
    }

    #[test]
    fn debug_does_not_leak_key() {
        let wallet = Wallet::from_private_key(DEV_KEY).unwrap();
        let debug = format!("{wallet:?}");
        assert!(!debug.contains(&DEV_KEY[2..]));
    }

    #[test]
    fn generated_wallets_differ() {
        assert_ne!(Wallet::generate().address(), Wallet::generate().address());
    }
}
