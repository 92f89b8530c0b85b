//! Signing client: a wallet bound to a chain transport.
//!
//! # Responsibilities
//! - Fix sender address, chain id, gas price and gas limits for the session
//! - Wrap the transport's broadcast with account lookup, fee and signature
//! - Extract code ids and contract addresses from transaction logs
//!
//! Construction never touches the network. Each signed operation costs one
//! account read and one broadcast; queries never broadcast.

use std::fmt;

use serde_json::Value;

use crate::blockchain::lcd::LcdTransport;
use crate::blockchain::transport::ChainTransport;
use crate::blockchain::tx::{sign_tx, Msg, StdFee};
use crate::blockchain::types::{
    AccountInfo, BlockchainError, BlockchainResult, CodeId, Coin, ExecuteResult,
    InstantiateResult, TxResponse, UploadMeta, UploadResult,
};
use crate::blockchain::wallet::HdWallet;
use crate::config::{GasKind, NetworkConfig};
use crate::observability::metrics;

const MESSAGE_EVENT: &str = "message";

/// Authenticated connection to a chain endpoint.
pub struct SigningClient<T: ChainTransport = LcdTransport> {
    wallet: HdWallet,
    sender: String,
    config: NetworkConfig,
    transport: T,
}

impl SigningClient<LcdTransport> {
    /// Connect over the REST transport described by `config`.
    pub fn connect_lcd(wallet: HdWallet, config: &NetworkConfig) -> BlockchainResult<Self> {
        let transport = LcdTransport::new(config)?;
        Ok(Self::connect(wallet, config, transport))
    }
}

impl<T: ChainTransport> SigningClient<T> {
    /// Bind `wallet` to `transport`. The sender is the wallet's first account.
    pub fn connect(wallet: HdWallet, config: &NetworkConfig, transport: T) -> Self {
        let sender = wallet.address().to_string();
        tracing::debug!(
            sender = %sender,
            chain_id = %config.network_id,
            endpoint = %config.http_url,
            "Signing client ready"
        );
        Self {
            wallet,
            sender,
            config: config.clone(),
            transport,
        }
    }

    pub fn sender_address(&self) -> &str {
        &self.sender
    }

    pub fn wallet(&self) -> &HdWallet {
        &self.wallet
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The sender's on-chain account, `None` if it has never been funded.
    pub async fn get_account(&self) -> BlockchainResult<Option<AccountInfo>> {
        self.transport.get_account(&self.sender).await
    }

    /// Read-only smart query. Never broadcasts.
    pub async fn query_contract_smart(&self, address: &str, query: &Value) -> BlockchainResult<Value> {
        let result = self.transport.query_smart(address, query).await;
        metrics::record_query(result.is_ok());
        if let Err(e) = &result {
            tracing::debug!(contract = %address, error = %e, "Smart query failed");
        }
        result
    }

    /// Store contract bytecode on chain.
    pub async fn upload(&self, wasm: &[u8], meta: UploadMeta) -> BlockchainResult<UploadResult> {
        let msg = Msg::store_code(&self.sender, wasm, &meta);
        let response = self.sign_and_broadcast(vec![msg], GasKind::Upload, "").await?;

        let code_id: CodeId = response
            .require_attribute(MESSAGE_EVENT, "code_id")?
            .parse()
            .map_err(|e| BlockchainError::Decode(format!("code_id is not a number: {e}")))?;

        tracing::info!(code_id, tx_hash = %response.txhash, bytes = wasm.len(), "Bytecode uploaded");
        Ok(UploadResult {
            code_id,
            transaction_hash: response.txhash,
        })
    }

    /// Create a contract instance from uploaded code.
    pub async fn instantiate(
        &self,
        code_id: CodeId,
        init_msg: &Value,
        label: &str,
        memo: &str,
        funds: &[Coin],
    ) -> BlockchainResult<InstantiateResult> {
        let msg = Msg::instantiate_contract(&self.sender, code_id, label, init_msg, funds);
        let response = self.sign_and_broadcast(vec![msg], GasKind::Init, memo).await?;

        let contract_address = response
            .require_attribute(MESSAGE_EVENT, "contract_address")?
            .to_string();

        tracing::info!(code_id, contract = %contract_address, label, "Contract instantiated");
        Ok(InstantiateResult {
            contract_address,
            transaction_hash: response.txhash,
        })
    }

    /// Execute a contract message, attaching `funds` as `sent_funds`.
    pub async fn execute(
        &self,
        contract: &str,
        msg: &Value,
        memo: &str,
        funds: &[Coin],
        gas: GasKind,
    ) -> BlockchainResult<ExecuteResult> {
        let msg = Msg::execute_contract(&self.sender, contract, msg, funds);
        let response = self.sign_and_broadcast(vec![msg], gas, memo).await?;
        Ok(ExecuteResult {
            transaction_hash: response.txhash,
        })
    }

    /// Bank transfer from the sender. Returns the transaction hash.
    pub async fn send_tokens(
        &self,
        recipient: &str,
        amount: &[Coin],
        memo: &str,
    ) -> BlockchainResult<String> {
        let msg = Msg::send(&self.sender, recipient, amount);
        let response = self.sign_and_broadcast(vec![msg], GasKind::Transfer, memo).await?;
        Ok(response.txhash)
    }

    async fn sign_and_broadcast(
        &self,
        msgs: Vec<Msg>,
        gas: GasKind,
        memo: &str,
    ) -> BlockchainResult<TxResponse> {
        let account = self
            .get_account()
            .await?
            .ok_or_else(|| BlockchainError::AccountNotFound(self.sender.clone()))?;

        let fee = StdFee::from_gas(&self.config.gas_price, self.config.gas_limits.limit(gas));
        let tx = sign_tx(
            &self.wallet,
            &self.config.network_id,
            account.account_number,
            account.sequence,
            msgs,
            fee,
            memo,
        )?;

        let response = match self.transport.broadcast(&tx).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_broadcast(gas.as_str(), false);
                tracing::warn!(kind = gas.as_str(), error = %e, "Broadcast failed");
                return Err(e);
            }
        };

        if response.code != 0 {
            metrics::record_broadcast(gas.as_str(), false);
            tracing::warn!(
                kind = gas.as_str(),
                tx_hash = %response.txhash,
                code = response.code,
                log = %response.raw_log,
                "Transaction failed"
            );
            return Err(BlockchainError::TxFailed {
                code: response.code,
                log: response.raw_log,
            });
        }

        metrics::record_broadcast(gas.as_str(), true);
        tracing::debug!(
            kind = gas.as_str(),
            tx_hash = %response.txhash,
            height = response.height,
            sequence = account.sequence,
            "Transaction committed"
        );
        Ok(response)
    }
}

impl<T: ChainTransport> fmt::Debug for SigningClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningClient")
            .field("sender", &self.sender)
            .field("chain_id", &self.config.network_id)
            .field("endpoint", &self.config.http_url)
            .finish()
    }
}
