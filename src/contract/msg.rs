//! Quadratic-funding contract messages and responses.
//!
//! Field names follow the contract's JSON exactly, including the camelCase
//! `fundAddress` and `proposalId` in execute messages.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::blockchain::types::{u64_from_any, Coin};

/// Opaque bytes carried as base64 on the wire.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binary({})", self.to_base64())
    }
}

impl Serialize for Binary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Binary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s)
            .map(Binary)
            .map_err(serde::de::Error::custom)
    }
}

/// When a period ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiration {
    /// Block height.
    AtHeight(#[serde(deserialize_with = "u64_from_any")] u64),
    /// Unix time in seconds.
    AtTime(#[serde(deserialize_with = "u64_from_any")] u64),
    Never {},
}

impl Default for Expiration {
    fn default() -> Self {
        Expiration::Never {}
    }
}

/// Matching-algorithm selector. Passed through to the contract untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QfAlgorithm(pub Value);

impl Default for QfAlgorithm {
    fn default() -> Self {
        Self(Value::Object(Default::default()))
    }
}

/// Instantiation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitMsg {
    pub admin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_proposal_whitelist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_proposal_whitelist: Option<Vec<String>>,
    pub voting_period: Expiration,
    pub proposal_period: Expiration,
    pub budget_denom: String,
    #[serde(default)]
    pub algorithm: QfAlgorithm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    CreateProposal {
        name: String,
        title: String,
        description: String,
        #[serde(rename = "fundAddress")]
        fund_address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Binary>,
    },
    Vote {
        #[serde(rename = "proposalId")]
        proposal_id: u64,
    },
    TriggerDistribution {},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Proposal { id: u64 },
    AllProposals {},
    ProposalByFundAddress { fund_address: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(default, deserialize_with = "u64_from_any")]
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Binary>,
    pub fund_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "proposalId", alias = "proposal_id", deserialize_with = "u64_from_any")]
    pub proposal_id: u64,
    pub voter: String,
    pub fund: Coin,
}

/// `all_proposals` answers either with a bare list or a `proposals` wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AllProposalsResponse {
    List(Vec<Proposal>),
    Wrapped { proposals: Vec<Proposal> },
}

impl AllProposalsResponse {
    pub fn into_proposals(self) -> Vec<Proposal> {
        match self {
            AllProposalsResponse::List(proposals) => proposals,
            AllProposalsResponse::Wrapped { proposals } => proposals,
        }
    }
}
