//! REST (LCD) transport.
//!
//! # Endpoints
//! - `GET  /auth/accounts/{address}`
//! - `GET  /wasm/contract/{address}/smart/{hex query}?encoding=hex`
//! - `POST /txs` with `{"tx": ..., "mode": "block"}`
//!
//! Every request is bounded by the configured timeout. Any non-2xx answer
//! becomes [`BlockchainError::Transport`] carrying the status and body.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::blockchain::transport::ChainTransport;
use crate::blockchain::tx::StdTx;
use crate::blockchain::types::{
    u64_from_any, AccountInfo, BlockchainError, BlockchainResult, Coin, TxLog, TxResponse,
};
use crate::config::NetworkConfig;

// ---------------------------------------------------------------------------
// Wire types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Wrapped<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct AccountEnvelope {
    value: AccountValue,
}

#[derive(Debug, Deserialize)]
struct AccountValue {
    #[serde(default)]
    address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    coins: Vec<Coin>,
    #[serde(default, deserialize_with = "u64_from_any")]
    account_number: u64,
    #[serde(default, deserialize_with = "u64_from_any")]
    sequence: u64,
}

#[derive(Debug, Deserialize)]
struct SmartResult {
    smart: String,
}

#[derive(Debug, Serialize)]
struct BroadcastRequest<'a> {
    tx: &'a StdTx,
    mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    #[serde(default, deserialize_with = "u64_from_any")]
    height: u64,
    txhash: String,
    #[serde(default)]
    code: u32,
    #[serde(default)]
    raw_log: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    logs: Vec<TxLog>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// [`ChainTransport`] over the LCD REST API.
#[derive(Clone)]
pub struct LcdTransport {
    base_url: String,
    http: reqwest::Client,
}

impl LcdTransport {
    /// Build a transport for `config.http_url`. No request is made.
    pub fn new(config: &NetworkConfig) -> BlockchainResult<Self> {
        let url = url::Url::parse(&config.http_url).map_err(|e| BlockchainError::InvalidUrl {
            url: config.http_url.clone(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> BlockchainResult<R> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BlockchainError::Transport {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| BlockchainError::Decode(format!("unexpected response body: {e}")))
    }
}

#[async_trait]
impl ChainTransport for LcdTransport {
    async fn get_account(&self, address: &str) -> BlockchainResult<Option<AccountInfo>> {
        let url = format!("{}/auth/accounts/{}", self.base_url, address);
        let response = self.http.get(&url).send().await?;
        let account: Wrapped<AccountEnvelope> = Self::read_json(response).await?;
        let value = account.result.value;

        // Unknown accounts come back as an empty record.
        if value.address.is_empty() {
            tracing::debug!(address, "Account not found on chain");
            return Ok(None);
        }

        Ok(Some(AccountInfo {
            address: value.address,
            account_number: value.account_number,
            sequence: value.sequence,
            balance: value.coins,
        }))
    }

    async fn query_smart(&self, contract: &str, query: &Value) -> BlockchainResult<Value> {
        let encoded = hex::encode(serde_json::to_vec(query)?);
        let url = format!(
            "{}/wasm/contract/{}/smart/{}?encoding=hex",
            self.base_url, contract, encoded
        );
        let response = self.http.get(&url).send().await?;
        let wrapped: Wrapped<SmartResult> = Self::read_json(response).await?;

        let raw = STANDARD
            .decode(wrapped.result.smart)
            .map_err(|e| BlockchainError::Decode(format!("smart query result is not base64: {e}")))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn broadcast(&self, tx: &StdTx) -> BlockchainResult<TxResponse> {
        let url = format!("{}/txs", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&BroadcastRequest { tx, mode: "block" })
            .send()
            .await?;
        let result: BroadcastResponse = Self::read_json(response).await?;

        Ok(TxResponse {
            height: result.height,
            txhash: result.txhash,
            code: result.code,
            raw_log: result.raw_log,
            logs: result.logs,
        })
    }
}

impl std::fmt::Debug for LcdTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LcdTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected() {
        let config = NetworkConfig {
            http_url: "not a url".to_string(),
            ..NetworkConfig::default()
        };
        assert!(matches!(
            LcdTransport::new(&config),
            Err(BlockchainError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = NetworkConfig {
            http_url: "http://localhost:1317/".to_string(),
            ..NetworkConfig::default()
        };
        let transport = LcdTransport::new(&config).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:1317");
    }

    #[test]
    fn test_account_value_decoding() {
        let json = r#"{"height":"10","result":{"type":"cosmos-sdk/Account","value":{
            "address":"cosmos1abc","coins":[{"denom":"ucosm","amount":"1000"}],
            "public_key":null,"account_number":"7","sequence":3}}}"#;
        let wrapped: Wrapped<AccountEnvelope> = serde_json::from_str(json).unwrap();
        let value = wrapped.result.value;
        assert_eq!(value.address, "cosmos1abc");
        assert_eq!(value.account_number, 7);
        assert_eq!(value.sequence, 3);
        assert_eq!(value.coins, vec![Coin::new(1000, "ucosm")]);
    }

    #[test]
    fn test_empty_account_decoding() {
        let json = r#"{"height":"10","result":{"type":"cosmos-sdk/Account","value":{
            "address":"","coins":null,"public_key":null,"account_number":"0","sequence":"0"}}}"#;
        let wrapped: Wrapped<AccountEnvelope> = serde_json::from_str(json).unwrap();
        assert!(wrapped.result.value.address.is_empty());
        assert!(wrapped.result.value.coins.is_empty());
    }

    #[test]
    fn test_broadcast_response_decoding() {
        let json = r#"{"height":"42","txhash":"ABCD","raw_log":"[]","logs":[{"msg_index":0,
            "log":"","events":[{"type":"message","attributes":[{"key":"code_id","value":"3"}]}]}]}"#;
        let response: BroadcastResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.height, 42);
        assert_eq!(response.code, 0);
        assert_eq!(response.logs[0].events[0].attributes[0].value, "3");

        let failed = r#"{"height":"0","txhash":"EF","code":5,"raw_log":"insufficient funds"}"#;
        let response: BroadcastResponse = serde_json::from_str(failed).unwrap();
        assert_eq!(response.code, 5);
        assert!(response.logs.is_empty());
    }
}
