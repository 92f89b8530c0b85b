//! Contract client factory: bytecode upload, instantiation and attaching to
//! existing instances.

use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::client::SigningClient;
use crate::blockchain::lcd::LcdTransport;
use crate::blockchain::transport::ChainTransport;
use crate::blockchain::types::{BlockchainError, BlockchainResult, CodeId, UploadMeta};
use crate::config::ContractSourceConfig;
use crate::contract::instance::QuadraticFundingInstance;
use crate::contract::msg::InitMsg;
use crate::observability::metrics;

/// Factory for quadratic-funding contract handles.
pub struct QuadraticFunding<T: ChainTransport = LcdTransport> {
    client: Arc<SigningClient<T>>,
    source: ContractSourceConfig,
    http: reqwest::Client,
}

impl<T: ChainTransport> QuadraticFunding<T> {
    pub fn new(client: Arc<SigningClient<T>>, source: ContractSourceConfig) -> BlockchainResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(client.config().request_timeout_secs))
            .build()?;
        Ok(Self { client, source, http })
    }

    pub fn client(&self) -> &Arc<SigningClient<T>> {
        &self.client
    }

    pub fn source(&self) -> &ContractSourceConfig {
        &self.source
    }

    /// Fetch the bytecode artifact and store it on chain.
    ///
    /// Anything but a 200 from the artifact URL aborts before signing.
    pub async fn upload(&self) -> BlockchainResult<CodeId> {
        let wasm = self.download_wasm().await?;
        let meta = UploadMeta {
            source: self.source.source.clone(),
            builder: self.source.builder.clone(),
        };
        let result = self.client.upload(&wasm, meta).await?;
        Ok(result.code_id)
    }

    /// Instantiate uploaded code and return a handle to the new contract.
    pub async fn instantiate(
        &self,
        code_id: CodeId,
        init_msg: &InitMsg,
        label: &str,
    ) -> BlockchainResult<QuadraticFundingInstance<T>> {
        let msg = serde_json::to_value(init_msg)?;
        let memo = format!("Init {label}");
        let result = self
            .client
            .instantiate(code_id, &msg, label, &memo, &[])
            .await?;
        Ok(self.attach(result.contract_address))
    }

    /// Bind to an existing contract. Purely local.
    pub fn attach(&self, contract_address: impl Into<String>) -> QuadraticFundingInstance<T> {
        QuadraticFundingInstance::new(Arc::clone(&self.client), contract_address)
    }

    async fn download_wasm(&self) -> BlockchainResult<Vec<u8>> {
        let url = &self.source.wasm_url;
        tracing::info!(url = %url, "Downloading contract bytecode");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(url = %url, status = status.as_u16(), "Bytecode download failed");
            return Err(BlockchainError::Download {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        metrics::record_bytecode_download(bytes.len());
        tracing::debug!(url = %url, bytes = bytes.len(), "Bytecode downloaded");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transport::MockTransport;
    use crate::blockchain::types::{AccountInfo, Attribute, Event, TxLog, TxResponse};
    use crate::blockchain::wallet::HdWallet;
    use crate::config::NetworkConfig;
    use crate::contract::msg::{Expiration, QfAlgorithm};

    fn factory() -> QuadraticFunding<MockTransport> {
        let config = NetworkConfig::default();
        let wallet = HdWallet::generate(&config.hd_path, "cosmos").unwrap();
        let transport = MockTransport::with_account(AccountInfo {
            address: wallet.address().to_string(),
            account_number: 4,
            sequence: 0,
            balance: Vec::new(),
        });
        let client = Arc::new(SigningClient::connect(wallet, &config, transport));
        QuadraticFunding::new(client, ContractSourceConfig::default()).unwrap()
    }

    #[test]
    fn test_attach_is_local() {
        let factory = factory();
        let instance = factory.attach("addr123");

        assert_eq!(instance.contract_address(), "addr123");
        assert_eq!(factory.client().transport().call_count(), 0);
    }

    #[tokio::test]
    async fn test_instantiate_uses_init_memo_and_no_funds() {
        let factory = factory();
        factory.client().transport().push_tx_response(TxResponse {
            height: 5,
            txhash: "INIT".to_string(),
            code: 0,
            raw_log: String::new(),
            logs: vec![TxLog {
                msg_index: 0,
                events: vec![Event {
                    kind: "message".to_string(),
                    attributes: vec![Attribute {
                        key: "contract_address".into(),
                        value: "cosmos1contract".into(),
                    }],
                }],
            }],
        }).unwrap();
        let init = InitMsg {
            admin: factory.client().sender_address().to_string(),
            create_proposal_whitelist: None,
            vote_proposal_whitelist: None,
            voting_period: Expiration::AtHeight(1000),
            proposal_period: Expiration::AtHeight(500),
            budget_denom: "ucosm".to_string(),
            algorithm: QfAlgorithm::default(),
        };

        let instance = factory.instantiate(9, &init, "qf round 1").await.unwrap();

        assert_eq!(instance.contract_address(), "cosmos1contract");
        let broadcasts = factory.client().transport().broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0].memo, "Init qf round 1");
        assert_eq!(broadcasts[0].msg[0].kind, "wasm/MsgInstantiateContract");
        assert_eq!(broadcasts[0].msg[0].value["code_id"], "9");
        assert_eq!(broadcasts[0].msg[0].value["init_funds"], serde_json::json!([]));
        assert_eq!(broadcasts[0].msg[0].value["init_msg"]["budget_denom"], "ucosm");
    }
}
