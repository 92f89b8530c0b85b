//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Chain endpoint, key material and gas policy.
    pub network: NetworkConfig,

    /// Where the contract bytecode comes from.
    pub contract: ContractSourceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network configuration: everything needed to provision a wallet and sign
/// transactions against one chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// LCD REST endpoint (e.g., "https://lcd.heldernet.cosmwasm.com").
    pub http_url: String,

    /// Chain ID used in sign docs.
    pub network_id: String,

    /// Denomination requested from the faucet.
    pub fee_token: String,

    /// Gas price, e.g. "0.025ucosm".
    pub gas_price: GasPrice,

    /// Bech32 human readable prefix for account addresses.
    pub bech32_prefix: String,

    /// HD derivation path for the signing key.
    pub hd_path: String,

    /// Optional faucet endpoint. No faucet is contacted when unset.
    pub faucet_url: Option<String>,

    /// Key file used when the caller does not name one.
    pub default_key_file: PathBuf,

    /// Gas limits per operation kind.
    pub gas_limits: GasLimits,

    /// Per-request timeout for all HTTP calls in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_url: "https://lcd.heldernet.cosmwasm.com".to_string(),
            network_id: "hackatom-wasm".to_string(),
            fee_token: "ucosm".to_string(),
            gas_price: GasPrice {
                atomics: 25,
                decimals: 3,
                denom: "ucosm".to_string(),
            },
            bech32_prefix: "cosmos".to_string(),
            hd_path: "m/44'/118'/0'/0/0".to_string(),
            faucet_url: Some("https://faucet.heldernet.cosmwasm.com/credit".to_string()),
            default_key_file: default_key_file(),
            gas_limits: GasLimits::default(),
            request_timeout_secs: 30,
        }
    }
}

fn default_key_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".heldernet.key")
}

/// Gas limits per operation kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasLimits {
    /// Storing contract bytecode.
    pub upload: u64,
    /// Instantiating a contract.
    pub init: u64,
    /// Generic contract execution.
    pub exec: u64,
    /// Executions that register new contract state (proposal creation).
    pub register: u64,
    /// Bank transfers.
    pub transfer: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            upload: 1_500_000,
            init: 600_000,
            exec: 200_000,
            register: 800_000,
            transfer: 80_000,
        }
    }
}

/// Operation kinds that map onto a [`GasLimits`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasKind {
    Upload,
    Init,
    Exec,
    Register,
    Transfer,
}

impl GasKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GasKind::Upload => "upload",
            GasKind::Init => "init",
            GasKind::Exec => "exec",
            GasKind::Register => "register",
            GasKind::Transfer => "transfer",
        }
    }
}

impl GasLimits {
    /// Gas limit for an operation kind.
    pub fn limit(&self, kind: GasKind) -> u64 {
        match kind {
            GasKind::Upload => self.upload,
            GasKind::Init => self.init,
            GasKind::Exec => self.exec,
            GasKind::Register => self.register,
            GasKind::Transfer => self.transfer,
        }
    }
}

/// Price per unit of gas as a fixed-point decimal and a denomination.
///
/// `0.025ucosm` is stored as `atomics = 25`, `decimals = 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    pub atomics: u128,
    pub decimals: u32,
    pub denom: String,
}

/// Most fractional digits a gas price may carry.
pub const MAX_GAS_PRICE_DECIMALS: u32 = 18;

/// Error parsing a gas price string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid gas price '{0}': expected <decimal><denom>, e.g. 0.025ucosm")]
pub struct GasPriceParseError(pub String);

impl GasPrice {
    /// Fee amount for a gas limit, rounded up to a whole unit.
    pub fn fee_amount(&self, gas_limit: u64) -> u128 {
        let raw = self.atomics.saturating_mul(gas_limit as u128);
        match 10u128.checked_pow(self.decimals) {
            Some(scale) => raw.div_ceil(scale),
            // The scale exceeds any product, so a non-zero fee is one unit.
            None => u128::from(raw > 0),
        }
    }
}

impl FromStr for GasPrice {
    type Err = GasPriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GasPriceParseError(s.to_string());
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(err)?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() || denom.len() < 2 {
            return Err(err());
        }

        let (whole, frac) = match amount.split_once('.') {
            Some((w, f)) => (w, f),
            None => (amount, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if frac.len() > MAX_GAS_PRICE_DECIMALS as usize {
            return Err(err());
        }
        let digits = format!("{whole}{frac}");
        let atomics: u128 = digits.parse().map_err(|_| err())?;

        Ok(Self {
            atomics,
            decimals: frac.len() as u32,
            denom: denom.to_string(),
        })
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = format!("{:0>width$}", self.atomics, width = self.decimals as usize + 1);
        let (whole, frac) = digits.split_at(digits.len() - self.decimals as usize);
        if frac.is_empty() {
            write!(f, "{}{}", whole, self.denom)
        } else {
            write!(f, "{}.{}{}", whole, frac, self.denom)
        }
    }
}

impl Serialize for GasPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GasPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Origin of the contract bytecode and its provenance metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractSourceConfig {
    /// URL of the compiled wasm artifact.
    pub wasm_url: String,

    /// Source repository recorded on-chain with the upload.
    pub source: String,

    /// Builder image recorded on-chain with the upload.
    pub builder: String,
}

impl Default for ContractSourceConfig {
    fn default() -> Self {
        Self {
            wasm_url: "https://github.com/CosmWasm/cosmwasm-examples/releases/download/nameservice-0.7.0/contract.wasm".to_string(),
            source: "https://github.com/CosmWasm/cosmwasm-examples/tree/nameservice-0.7.0/nameservice".to_string(),
            builder: "cosmwasm/rust-optimizer:0.10.4".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
