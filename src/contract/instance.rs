//! Handle to one deployed quadratic-funding contract.
//!
//! Queries go through the transport's smart query and never broadcast.
//! Actions sign and broadcast exactly one transaction; attached funds travel
//! as `sent_funds`, never inside the message body.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::blockchain::client::SigningClient;
use crate::blockchain::lcd::LcdTransport;
use crate::blockchain::transport::ChainTransport;
use crate::blockchain::types::{BlockchainResult, Coin};
use crate::config::GasKind;
use crate::contract::msg::{AllProposalsResponse, Binary, ExecuteMsg, Proposal, QueryMsg};

/// A shared signing client bound to one contract address.
pub struct QuadraticFundingInstance<T: ChainTransport = LcdTransport> {
    client: Arc<SigningClient<T>>,
    contract_address: String,
}

impl<T: ChainTransport> Clone for QuadraticFundingInstance<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            contract_address: self.contract_address.clone(),
        }
    }
}

impl<T: ChainTransport> std::fmt::Debug for QuadraticFundingInstance<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadraticFundingInstance")
            .field("contract_address", &self.contract_address)
            .field("sender", &self.client.sender_address())
            .finish()
    }
}

impl<T: ChainTransport> QuadraticFundingInstance<T> {
    pub fn new(client: Arc<SigningClient<T>>, contract_address: impl Into<String>) -> Self {
        Self {
            client,
            contract_address: contract_address.into(),
        }
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn client(&self) -> &Arc<SigningClient<T>> {
        &self.client
    }

    pub async fn proposal(&self, id: u64) -> BlockchainResult<Proposal> {
        self.query(&QueryMsg::Proposal { id }).await
    }

    pub async fn all_proposals(&self) -> BlockchainResult<Vec<Proposal>> {
        let response: AllProposalsResponse = self.query(&QueryMsg::AllProposals {}).await?;
        Ok(response.into_proposals())
    }

    pub async fn proposal_by_fund_address(&self, fund_address: &str) -> BlockchainResult<Proposal> {
        self.query(&QueryMsg::ProposalByFundAddress {
            fund_address: fund_address.to_string(),
        })
        .await
    }

    /// Register a proposal, paying `amount`. Returns the transaction hash.
    pub async fn create_proposal(
        &self,
        name: &str,
        title: &str,
        description: &str,
        fund_address: &str,
        amount: &[Coin],
        metadata: Option<Binary>,
    ) -> BlockchainResult<String> {
        let msg = ExecuteMsg::CreateProposal {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            fund_address: fund_address.to_string(),
            metadata,
        };
        self.execute(&msg, amount, GasKind::Register).await
    }

    /// Vote for a proposal with `amount`. Returns the transaction hash.
    pub async fn vote_proposal(&self, proposal_id: u64, amount: &[Coin]) -> BlockchainResult<String> {
        self.execute(&ExecuteMsg::Vote { proposal_id }, amount, GasKind::Exec)
            .await
    }

    /// Ask the contract to distribute the pooled funds.
    pub async fn trigger_distribution(&self) -> BlockchainResult<String> {
        self.execute(&ExecuteMsg::TriggerDistribution {}, &[], GasKind::Exec)
            .await
    }

    async fn query<R: DeserializeOwned>(&self, msg: &QueryMsg) -> BlockchainResult<R> {
        let query = serde_json::to_value(msg)?;
        let value = self
            .client
            .query_contract_smart(&self.contract_address, &query)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn execute(&self, msg: &ExecuteMsg, funds: &[Coin], gas: GasKind) -> BlockchainResult<String> {
        let msg = serde_json::to_value(msg)?;
        let result = self
            .client
            .execute(&self.contract_address, &msg, "", funds, gas)
            .await?;
        tracing::info!(
            contract = %self.contract_address,
            tx_hash = %result.transaction_hash,
            kind = gas.as_str(),
            "Contract action committed"
        );
        Ok(result.transaction_hash)
    }
}
