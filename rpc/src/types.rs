// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use ethereum_types::{Address, H256, U256, U64};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Arbitrary bytes, serialized as `0x`-prefixed hex.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits)
            .map(Bytes)
            .map_err(serde::de::Error::custom)
    }
}

/// Parameters of `eth_call` and `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// `None` for contract creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: H256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `1` on success, `0` when execution reverted.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub gas_used: Option<U256>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Pre-Byzantium receipts carry no status; treat them as successful.
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| !s.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn receipt_deserializes_from_node_json() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockNumber": "0x1b4",
            "status": "0x1",
            "contractAddress": null,
            "gasUsed": "0x5208",
            "cumulativeGasUsed": "0x5208",
            "logs": [{
                "address": "0x8383c9bd7462f12eb996dd02f78234c0421a6fae",
                "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
                "data": "0x0001",
                "logIndex": "0x0"
            }]
        }))
        .unwrap();

        assert!(receipt.succeeded());
        assert_eq!(receipt.block_number, Some(U64::from(0x1b4)));
        assert_eq!(receipt.gas_used, Some(U256::from(21000)));
        assert_eq!(receipt.logs[0].data, Bytes(vec![0, 1]));
        assert!(receipt.contract_address.is_none());
    }

    #[test]
    fn reverted_receipt_reports_failure() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "status": "0x0",
        }))
        .unwrap();
        assert!(!receipt.succeeded());
        assert!(receipt.logs.is_empty());
    }

    #[test]
    fn call_request_omits_unset_fields() {
        let call = CallRequest {
            to: Some(Address::repeat_byte(0xab)),
            data: Bytes(vec![0xde, 0xad]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"to": "0xabababababababababababababababababababab", "data": "0xdead"})
        );
    }
}
