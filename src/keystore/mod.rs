//! Encrypted key store.
//!
//! # Data Flow
//! ```text
//! HdWallet + password
//!     → crypto.rs (Argon2id key derivation, AES-256-GCM)
//!     → EncryptedKeyBlob (JSON envelope)
//!     → store.rs (single file, owner-only permissions)
//! ```
//!
//! # Security Constraints
//! - Plaintext key material only lives in zeroizing buffers
//! - A failed load never writes to the key file
//! - Read failures, malformed files and wrong passwords are distinct errors

pub mod crypto;
pub mod store;

pub use crypto::{decrypt_wallet, encrypt_wallet, EncryptedKeyBlob};
pub use store::{load, save};

use thiserror::Error;

/// Errors from reading, writing or decrypting a key file.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// The key file could not be read (absent, permissions, I/O).
    #[error("failed to read key file: {0}")]
    Read(#[source] std::io::Error),

    /// The key file could not be written.
    #[error("failed to write key file: {0}")]
    Write(#[source] std::io::Error),

    /// The file is not a key envelope this crate understands.
    #[error("malformed key file: {0}")]
    Malformed(String),

    /// Authentication failed: wrong password or corrupted ciphertext.
    #[error("decryption failed: wrong password or corrupted key file")]
    Decrypt,

    /// Password key derivation failed.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// The decrypted mnemonic could not be turned back into a wallet.
    #[error("stored wallet is invalid: {0}")]
    Wallet(String),
}

impl KeyStoreError {
    /// True only when the key file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, KeyStoreError::Read(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
