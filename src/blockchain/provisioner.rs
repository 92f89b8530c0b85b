//! Create-or-load orchestration on top of the key store.
//!
//! # Rules
//! - Only a missing key file leads to generation
//! - A wrong password, malformed file or any other read error propagates;
//!   the existing file is never replaced
//! - A freshly generated wallet that could not be written is still returned,
//!   flagged as not durable

use std::path::Path;

use crate::blockchain::types::BlockchainResult;
use crate::blockchain::wallet::HdWallet;
use crate::keystore::{self, KeyStoreError};

/// How a provisioned wallet came to be.
#[derive(Debug)]
pub enum WalletOrigin {
    /// Decrypted from an existing key file.
    Loaded,
    /// Generated and written to the key file.
    Created,
    /// Generated, but writing the key file failed.
    Unpersisted(KeyStoreError),
}

/// A wallet together with its provenance.
#[derive(Debug)]
pub struct ProvisionedWallet {
    pub wallet: HdWallet,
    pub origin: WalletOrigin,
}

impl ProvisionedWallet {
    /// False when the wallet exists only in memory.
    pub fn is_durable(&self) -> bool {
        !matches!(self.origin, WalletOrigin::Unpersisted(_))
    }

    pub fn into_wallet(self) -> HdWallet {
        self.wallet
    }
}

/// Load the wallet at `path`, or generate and persist one if no file exists.
pub async fn load_or_create(
    path: &Path,
    password: &str,
    hd_path: &str,
    prefix: &str,
) -> BlockchainResult<ProvisionedWallet> {
    // The load result is fully resolved before the generation branch.
    match keystore::load(path, password).await {
        Ok(wallet) => {
            tracing::info!(path = %path.display(), address = %wallet.address(), "Wallet loaded");
            Ok(ProvisionedWallet {
                wallet,
                origin: WalletOrigin::Loaded,
            })
        }
        Err(e) if e.is_not_found() => {
            tracing::info!(path = %path.display(), "No key file found, generating a new wallet");
            let wallet = HdWallet::generate(hd_path, prefix)?;

            let origin = match keystore::save(path, &wallet, password).await {
                Ok(()) => WalletOrigin::Created,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        address = %wallet.address(),
                        error = %e,
                        "New wallet could not be persisted; it only exists for this session"
                    );
                    WalletOrigin::Unpersisted(e)
                }
            };
            Ok(ProvisionedWallet { wallet, origin })
        }
        Err(e) => Err(e.into()),
    }
}
