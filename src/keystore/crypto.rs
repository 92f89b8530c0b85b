use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::blockchain::wallet::HdWallet;
use crate::keystore::KeyStoreError;

/// Envelope type tag written into every key file.
pub const BLOB_TYPE: &str = "qf-client-hd-wallet-v1";

const KDF_ALGORITHM: &str = "argon2id";
const CIPHER_ALGORITHM: &str = "aes-256-gcm";

const AES_NONCE_LEN: usize = 12;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

// Argon2id parameters: m=19456 KiB (~19 MB), t=2, p=1.
const M_COST: u32 = 19_456;
const T_COST: u32 = 2;
const P_COST: u32 = 1;

// Ceilings for parameters read from a key file (m is in KiB, 2 GiB max).
const MAX_M_COST: u32 = 1 << 21;
const MAX_T_COST: u32 = 16;
const MAX_P_COST: u32 = 16;

/// Serialized, password-encrypted form of an [`HdWallet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKeyBlob {
    #[serde(rename = "type")]
    pub kind: String,
    pub kdf: KdfConfig,
    pub encryption: EncryptionConfig,
    /// Base64 AES-GCM ciphertext including the authentication tag.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfConfig {
    pub algorithm: String,
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
    /// Base64 salt.
    pub salt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionConfig {
    pub algorithm: String,
    /// Base64 nonce.
    pub nonce: String,
}

/// What actually gets encrypted.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct WalletPlaintext {
    mnemonic: String,
    hd_path: String,
    prefix: String,
}

impl EncryptedKeyBlob {
    /// Parse the JSON envelope. Does not decrypt.
    pub fn from_json(json: &str) -> Result<Self, KeyStoreError> {
        let blob: Self = serde_json::from_str(json)
            .map_err(|e| KeyStoreError::Malformed(format!("invalid envelope: {e}")))?;

        if blob.kind != BLOB_TYPE {
            return Err(KeyStoreError::Malformed(format!("unsupported key file type '{}'", blob.kind)));
        }
        if blob.kdf.algorithm != KDF_ALGORITHM {
            return Err(KeyStoreError::Malformed(format!("unsupported kdf '{}'", blob.kdf.algorithm)));
        }
        if blob.encryption.algorithm != CIPHER_ALGORITHM {
            return Err(KeyStoreError::Malformed(format!(
                "unsupported cipher '{}'",
                blob.encryption.algorithm
            )));
        }
        Ok(blob)
    }

    pub fn to_json(&self) -> Result<String, KeyStoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KeyStoreError::Malformed(format!("failed to serialize envelope: {e}")))
    }
}

/// Derive a 256-bit AES key from a password using Argon2id.
fn derive_key(
    password: &str,
    salt: &[u8],
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>, KeyStoreError> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let params = Params::new(m_cost, t_cost, p_cost, Some(KEY_LEN))
        .map_err(|e| KeyStoreError::Kdf(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| KeyStoreError::Kdf(e.to_string()))?;
    Ok(key)
}

fn check_kdf_bounds(kdf: &KdfConfig) -> Result<(), KeyStoreError> {
    if kdf.m_cost > MAX_M_COST || kdf.t_cost > MAX_T_COST || kdf.p_cost > MAX_P_COST {
        return Err(KeyStoreError::Malformed(format!(
            "kdf parameters out of range: m={} t={} p={}",
            kdf.m_cost, kdf.t_cost, kdf.p_cost
        )));
    }
    Ok(())
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, KeyStoreError> {
    STANDARD
        .decode(value)
        .map_err(|e| KeyStoreError::Malformed(format!("{name} is not valid base64: {e}")))
}

/// Encrypt a wallet under `password` with a fresh salt and nonce.
pub fn encrypt_wallet(wallet: &HdWallet, password: &str) -> Result<EncryptedKeyBlob, KeyStoreError> {
    let plaintext = WalletPlaintext {
        mnemonic: wallet.mnemonic().to_string(),
        hd_path: wallet.hd_path().to_string(),
        prefix: wallet.prefix().to_string(),
    };
    let serialized = Zeroizing::new(
        serde_json::to_vec(&plaintext)
            .map_err(|e| KeyStoreError::Malformed(format!("failed to serialize wallet: {e}")))?,
    );

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; AES_NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key_bytes = derive_key(password, &salt, M_COST, T_COST, P_COST)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes[..]));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), serialized.as_slice())
        .map_err(|e| KeyStoreError::Encrypt(e.to_string()))?;

    Ok(EncryptedKeyBlob {
        kind: BLOB_TYPE.to_string(),
        kdf: KdfConfig {
            algorithm: KDF_ALGORITHM.to_string(),
            m_cost: M_COST,
            t_cost: T_COST,
            p_cost: P_COST,
            salt: STANDARD.encode(salt),
        },
        encryption: EncryptionConfig {
            algorithm: CIPHER_ALGORITHM.to_string(),
            nonce: STANDARD.encode(nonce_bytes),
        },
        data: STANDARD.encode(ciphertext),
    })
}

/// Decrypt a blob produced by [`encrypt_wallet`].
///
/// Either returns a fully restored wallet or an error; nothing partial.
pub fn decrypt_wallet(blob: &EncryptedKeyBlob, password: &str) -> Result<HdWallet, KeyStoreError> {
    let salt = decode_field("salt", &blob.kdf.salt)?;
    let nonce_bytes = decode_field("nonce", &blob.encryption.nonce)?;
    let ciphertext = decode_field("data", &blob.data)?;

    if nonce_bytes.len() != AES_NONCE_LEN {
        return Err(KeyStoreError::Malformed(format!(
            "nonce must be {AES_NONCE_LEN} bytes, got {}",
            nonce_bytes.len()
        )));
    }

    check_kdf_bounds(&blob.kdf)?;
    let key_bytes = derive_key(password, &salt, blob.kdf.m_cost, blob.kdf.t_cost, blob.kdf.p_cost)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes[..]));
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
            .map_err(|_| KeyStoreError::Decrypt)?,
    );

    let restored: WalletPlaintext = serde_json::from_slice(&plaintext)
        .map_err(|e| KeyStoreError::Malformed(format!("decrypted payload is not a wallet: {e}")))?;

    HdWallet::from_mnemonic(&restored.mnemonic, &restored.hd_path, &restored.prefix)
        .map_err(|e| KeyStoreError::Wallet(e.to_string()))
}
