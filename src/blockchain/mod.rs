//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! key file + password
//!     → provisioner.rs (load, or generate on absence)
//!     → wallet.rs (HD derivation, signing)
//!     → client.rs (sender, fees, sign + broadcast)
//!     → tx.rs (amino-JSON envelope)
//!     → transport.rs / lcd.rs (REST endpoint)
//! ```
//!
//! # Security Constraints
//! - Never log mnemonics or private keys
//! - A key file is only ever created when none exists
//! - All endpoint calls have configurable timeouts
//! - No automatic retries

pub mod client;
pub mod faucet;
pub mod lcd;
pub mod provisioner;
pub mod transport;
pub mod tx;
pub mod types;
pub mod wallet;

pub use client::SigningClient;
pub use faucet::{ensure_funded, FaucetOutcome};
pub use lcd::LcdTransport;
pub use provisioner::{load_or_create, ProvisionedWallet, WalletOrigin};
pub use transport::{ChainTransport, MockTransport};
pub use types::{
    AccountInfo, BlockchainError, BlockchainResult, CodeId, Coin, ExecuteResult,
    InstantiateResult, TxResponse, UploadMeta, UploadResult,
};
pub use wallet::HdWallet;
