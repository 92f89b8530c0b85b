//! File-backed key store.
//!
//! `load` reads the whole file before any decryption attempt and never
//! writes. `save` rewrites the whole file.

use std::path::Path;

use crate::blockchain::wallet::HdWallet;
use crate::keystore::crypto::{decrypt_wallet, encrypt_wallet, EncryptedKeyBlob};
use crate::keystore::KeyStoreError;

/// Load and decrypt the wallet stored at `path`.
pub async fn load(path: &Path, password: &str) -> Result<HdWallet, KeyStoreError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(KeyStoreError::Read)?;

    let blob = EncryptedKeyBlob::from_json(&contents)?;
    let wallet = decrypt_wallet(&blob, password)?;

    tracing::debug!(path = %path.display(), address = %wallet.address(), "Key file decrypted");
    Ok(wallet)
}

/// Encrypt `wallet` under `password` and write it to `path`.
pub async fn save(path: &Path, wallet: &HdWallet, password: &str) -> Result<(), KeyStoreError> {
    let json = encrypt_wallet(wallet, password)?.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(KeyStoreError::Write)?;
    }
    tokio::fs::write(path, json)
        .await
        .map_err(KeyStoreError::Write)?;

    // Restrict file permissions to owner-only on Unix (0o600 = rw-------).
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(KeyStoreError::Write)?;
    }

    tracing::info!(path = %path.display(), address = %wallet.address(), "Key file saved");
    Ok(())
}
