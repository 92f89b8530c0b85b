//! Chain-specific types and error definitions.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::keystore::KeyStoreError;

/// On-chain identifier of uploaded bytecode.
pub type CodeId = u64;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Key file could not be read, written or decrypted.
    #[error("Key store error: {0}")]
    KeyStore(#[from] KeyStoreError),

    /// Invalid mnemonic, derivation path or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// A configured URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The chain endpoint answered with a non-success status.
    #[error("Endpoint returned {status}: {body}")]
    Transport { status: u16, body: String },

    /// The transaction was included but failed.
    #[error("Transaction failed with code {code}: {log}")]
    TxFailed { code: u32, log: String },

    /// The sender account has no on-chain record yet.
    #[error("Account {0} does not exist on chain")]
    AccountNotFound(String),

    /// The bytecode artifact could not be fetched.
    #[error("Download error: {url} returned {status}")]
    Download { url: String, status: u16 },

    /// The faucet rejected the funding request.
    #[error("Faucet returned {status}: {body}")]
    Faucet { status: u16, body: String },

    /// A response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A transaction succeeded but its logs lack an expected attribute.
    #[error("Transaction {tx_hash} has no '{key}' attribute in its logs")]
    MissingEvent { tx_hash: String, key: String },

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// 64-bit integers arrive as strings from the LCD and as numbers elsewhere.
pub(crate) fn u64_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) if s.is_empty() => Ok(0),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// A token amount in one denomination. The amount is a decimal string on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.to_string(),
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = BlockchainError;

    /// Parse `100ucosm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| BlockchainError::Decode(format!("coin '{s}' has no denom")))?;
        let (amount, denom) = s.split_at(split);
        let amount: u128 = amount
            .parse()
            .map_err(|_| BlockchainError::Decode(format!("coin '{s}' has no amount")))?;
        Ok(Self::new(amount, denom))
    }
}

/// On-chain account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    pub account_number: u64,
    pub sequence: u64,
    pub balance: Vec<Coin>,
}

/// A key/value pair inside an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// An event emitted while executing one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Logs for one message of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLog {
    #[serde(default)]
    pub msg_index: u32,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Result of broadcasting a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResponse {
    pub height: u64,
    pub txhash: String,
    /// Non-zero when the transaction failed.
    pub code: u32,
    pub raw_log: String,
    pub logs: Vec<TxLog>,
}

impl TxResponse {
    /// First attribute value with `key` in events of type `event_type`.
    pub fn find_attribute(&self, event_type: &str, key: &str) -> Option<&str> {
        self.logs
            .iter()
            .flat_map(|log| log.events.iter())
            .filter(|event| event.kind == event_type)
            .flat_map(|event| event.attributes.iter())
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    /// Like [`find_attribute`](Self::find_attribute) but a missing attribute is an error.
    pub fn require_attribute(&self, event_type: &str, key: &str) -> BlockchainResult<&str> {
        self.find_attribute(event_type, key)
            .ok_or_else(|| BlockchainError::MissingEvent {
                tx_hash: self.txhash.clone(),
                key: key.to_string(),
            })
    }
}

/// Provenance recorded alongside uploaded bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMeta {
    pub source: String,
    pub builder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub code_id: CodeId,
    pub transaction_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiateResult {
    pub contract_address: String,
    pub transaction_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteResult {
    pub transaction_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_parse() {
        let coin: Coin = "100ucosm".parse().unwrap();
        assert_eq!(coin, Coin::new(100, "ucosm"));
        assert_eq!(coin.to_string(), "100ucosm");

        assert!("ucosm".parse::<Coin>().is_err());
        assert!("100".parse::<Coin>().is_err());
    }

    #[test]
    fn test_coin_wire_format() {
        let json = serde_json::to_value(Coin::new(4000, "ucosm")).unwrap();
        assert_eq!(json, serde_json::json!({"denom": "ucosm", "amount": "4000"}));
    }

    #[test]
    fn test_find_attribute() {
        let response = TxResponse {
            height: 10,
            txhash: "ABC".to_string(),
            code: 0,
            raw_log: String::new(),
            logs: vec![TxLog {
                msg_index: 0,
                events: vec![Event {
                    kind: "message".to_string(),
                    attributes: vec![
                        Attribute { key: "module".into(), value: "wasm".into() },
                        Attribute { key: "code_id".into(), value: "12".into() },
                    ],
                }],
            }],
        };

        assert_eq!(response.find_attribute("message", "code_id"), Some("12"));
        assert_eq!(response.find_attribute("transfer", "code_id"), None);
        assert!(matches!(
            response.require_attribute("message", "contract_address"),
            Err(BlockchainError::MissingEvent { .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Download {
            url: "http://x/contract.wasm".to_string(),
            status: 404,
        };
        assert!(err.to_string().contains("404"));

        let err = BlockchainError::TxFailed { code: 5, log: "insufficient funds".into() };
        assert!(err.to_string().contains("insufficient funds"));
    }
}
