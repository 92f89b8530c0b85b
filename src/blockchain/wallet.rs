//! HD wallet derivation and payload signing.
//!
//! # Security
//! - The mnemonic and private key are never logged or printed by `Debug`
//! - Persistence goes through the encrypted key store only

use bip39::{Language, Mnemonic};
use coins_bip32::path::DerivationPath;
use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Entropy for a 12-word mnemonic.
const ENTROPY_LEN: usize = 16;

/// Public data of one account held by a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    /// Bech32 address.
    pub address: String,
    /// Compressed secp256k1 public key (33 bytes).
    pub pubkey: Vec<u8>,
}

/// A secp256k1 wallet derived from a BIP-39 mnemonic along one HD path.
#[derive(Clone)]
pub struct HdWallet {
    mnemonic: Mnemonic,
    hd_path: String,
    prefix: String,
    signing_key: SigningKey,
    account: AccountData,
}

impl HdWallet {
    /// Generate a wallet from fresh OS entropy.
    pub fn generate(hd_path: &str, prefix: &str) -> BlockchainResult<Self> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_LEN]);
        OsRng.fill_bytes(&mut entropy[..]);

        let mnemonic = Mnemonic::from_entropy(&entropy[..])
            .map_err(|e| BlockchainError::Wallet(format!("Mnemonic generation failed: {}", e)))?;

        let wallet = Self::from_parsed(mnemonic, hd_path, prefix)?;
        tracing::info!(address = %wallet.address(), hd_path = %hd_path, "Generated new wallet");
        Ok(wallet)
    }

    /// Restore a wallet from an English mnemonic phrase.
    pub fn from_mnemonic(phrase: &str, hd_path: &str, prefix: &str) -> BlockchainResult<Self> {
        let mnemonic = Mnemonic::parse_in(Language::English, phrase)
            .map_err(|e| BlockchainError::Wallet(format!("Invalid mnemonic: {}", e)))?;
        Self::from_parsed(mnemonic, hd_path, prefix)
    }

    fn from_parsed(mnemonic: Mnemonic, hd_path: &str, prefix: &str) -> BlockchainResult<Self> {
        use coins_bip32::prelude::*;

        let derivation_path = hd_path
            .parse::<DerivationPath>()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid derivation path '{}': {}", hd_path, e)))?;

        let seed = Zeroizing::new(mnemonic.to_seed(""));
        let master_key = XPriv::root_from_seed(&seed[..], None)
            .map_err(|e| BlockchainError::Wallet(format!("Failed to derive master key: {}", e)))?;
        let derived_key = master_key
            .derive_path(&derivation_path)
            .map_err(|e| BlockchainError::Wallet(format!("Failed to derive key: {}", e)))?;

        let signing_key: &SigningKey = derived_key.as_ref();
        let signing_key = signing_key.clone();

        let pubkey = signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec();
        let address = bech32_address(prefix, &pubkey)?;

        Ok(Self {
            mnemonic,
            hd_path: hd_path.to_string(),
            prefix: prefix.to_string(),
            signing_key,
            account: AccountData { address, pubkey },
        })
    }

    /// The mnemonic phrase. Callers must treat it as a secret.
    pub fn mnemonic(&self) -> Zeroizing<String> {
        Zeroizing::new(self.mnemonic.to_string())
    }

    pub fn hd_path(&self) -> &str {
        &self.hd_path
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// All accounts held by this wallet. Currently one per HD path.
    pub fn accounts(&self) -> Vec<AccountData> {
        vec![self.account.clone()]
    }

    /// Address of the first account.
    pub fn address(&self) -> &str {
        &self.account.address
    }

    /// Compressed public key of the first account.
    pub fn pubkey(&self) -> &[u8] {
        &self.account.pubkey
    }

    /// Sign `payload` (SHA-256 then ECDSA) and return the 64-byte `r || s`
    /// signature with a low S value.
    pub fn sign(&self, payload: &[u8]) -> [u8; 64] {
        let signature: Signature = self.signing_key.sign(payload);
        let signature = signature.normalize_s().unwrap_or(signature);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&signature.to_bytes());
        bytes
    }
}

impl PartialEq for HdWallet {
    fn eq(&self, other: &Self) -> bool {
        self.mnemonic == other.mnemonic
            && self.hd_path == other.hd_path
            && self.prefix == other.prefix
    }
}

impl Eq for HdWallet {}

impl fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdWallet")
            .field("address", &self.account.address)
            .field("hd_path", &self.hd_path)
            .finish_non_exhaustive()
    }
}

/// Bech32 address of a compressed public key: `ripemd160(sha256(pubkey))`.
pub fn bech32_address(prefix: &str, pubkey: &[u8]) -> BlockchainResult<String> {
    let hrp = bech32::Hrp::parse(prefix)
        .map_err(|e| BlockchainError::Wallet(format!("Invalid address prefix '{}': {}", prefix, e)))?;
    let hash = Ripemd160::digest(Sha256::digest(pubkey));
    bech32::encode::<bech32::Bech32>(hrp, &hash)
        .map_err(|e| BlockchainError::Wallet(format!("Bech32 encoding failed: {}", e)))
}
