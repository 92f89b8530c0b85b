//! Session setup.
//!
//! # Responsibilities
//! - Resolve the key file (explicit path or configured default)
//! - Provision the wallet (load, or create on absence)
//! - Connect the signing client
//! - Bootstrap the account through the faucet when one is configured
//!
//! # Design Decisions
//! - Fail fast: any error aborts setup, nothing is retried
//! - Steps run strictly in order; no network call before the wallet exists

use std::path::Path;

use zeroize::Zeroizing;

use crate::blockchain::client::SigningClient;
use crate::blockchain::faucet::{ensure_funded, FaucetOutcome};
use crate::blockchain::lcd::LcdTransport;
use crate::blockchain::provisioner::{load_or_create, ProvisionedWallet};
use crate::blockchain::transport::ChainTransport;
use crate::blockchain::types::BlockchainResult;
use crate::config::{ClientConfig, NetworkConfig};

/// A connected client and whether its wallet is on disk.
pub struct Session<T: ChainTransport = LcdTransport> {
    pub client: SigningClient<T>,
    /// False when the wallet was generated but the key file could not be
    /// written; it is lost when the process exits.
    pub durable: bool,
}

impl<T: ChainTransport> Session<T> {
    pub fn into_client(self) -> SigningClient<T> {
        self.client
    }
}

impl<T: ChainTransport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client)
            .field("durable", &self.durable)
            .finish()
    }
}

/// A seed phrase and whether its wallet is on disk.
pub struct RecoveredMnemonic {
    pub phrase: Zeroizing<String>,
    pub durable: bool,
}

impl std::fmt::Debug for RecoveredMnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveredMnemonic")
            .field("phrase", &"<redacted>")
            .field("durable", &self.durable)
            .finish()
    }
}

/// Entry point tying configuration, key store and chain together.
#[derive(Debug, Clone)]
pub struct Network {
    config: ClientConfig,
}

impl Network {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.config.network
    }

    /// `key_file` if given, otherwise the configured default.
    pub fn key_file<'a>(&'a self, key_file: Option<&'a Path>) -> &'a Path {
        key_file.unwrap_or(&self.config.network.default_key_file)
    }

    /// Load or create the wallet behind `key_file`.
    pub async fn provision(
        &self,
        password: &str,
        key_file: Option<&Path>,
    ) -> BlockchainResult<ProvisionedWallet> {
        let network = &self.config.network;
        load_or_create(
            self.key_file(key_file),
            password,
            &network.hd_path,
            &network.bech32_prefix,
        )
        .await
    }

    /// Provision, connect over REST and fund the account if needed.
    pub async fn setup(
        &self,
        password: &str,
        key_file: Option<&Path>,
    ) -> BlockchainResult<Session<LcdTransport>> {
        let transport = LcdTransport::new(&self.config.network)?;
        self.setup_with(transport, password, key_file).await
    }

    /// [`setup`](Self::setup) over any transport.
    pub async fn setup_with<T: ChainTransport>(
        &self,
        transport: T,
        password: &str,
        key_file: Option<&Path>,
    ) -> BlockchainResult<Session<T>> {
        let network = &self.config.network;
        let provisioned = self.provision(password, key_file).await?;
        let durable = provisioned.is_durable();
        let client = SigningClient::connect(provisioned.into_wallet(), network, transport);

        let faucet_url = network.faucet_url.as_deref().filter(|url| !url.is_empty());
        if let Some(url) = faucet_url {
            if ensure_funded(&client, url, &network.fee_token).await? == FaucetOutcome::Credited {
                tracing::info!(address = %client.sender_address(), "New account funded");
            }
        }

        Ok(Session { client, durable })
    }

    /// The wallet's seed phrase, creating the wallet if the key file is absent.
    pub async fn recover_mnemonic(
        &self,
        password: &str,
        key_file: Option<&Path>,
    ) -> BlockchainResult<RecoveredMnemonic> {
        let provisioned = self.provision(password, key_file).await?;
        Ok(RecoveredMnemonic {
            durable: provisioned.is_durable(),
            phrase: provisioned.wallet.mnemonic(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transport::MockTransport;
    use crate::blockchain::types::AccountInfo;
    use crate::blockchain::wallet::HdWallet;
    use crate::keystore;

    fn network(faucet_url: Option<&str>) -> Network {
        let mut config = ClientConfig::default();
        config.network.faucet_url = faucet_url.map(str::to_string);
        Network::new(config)
    }

    #[tokio::test]
    async fn setup_without_faucet_creates_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.key");
        let network = network(None);

        let session = network
            .setup_with(MockTransport::new(), "pw", Some(&path))
            .await
            .unwrap();
        let client = &session.client;

        assert!(session.durable);
        assert!(client.sender_address().starts_with("cosmos1"));
        assert!(path.exists());
        assert_eq!(client.transport().call_count(), 0);
    }

    #[tokio::test]
    async fn setup_with_funded_account_skips_faucet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.key");
        let wallet = HdWallet::generate("m/44'/118'/0'/0/0", "cosmos").unwrap();
        keystore::save(&path, &wallet, "pw").await.unwrap();
        let transport = MockTransport::with_account(AccountInfo {
            address: wallet.address().to_string(),
            account_number: 1,
            sequence: 0,
            balance: Vec::new(),
        });

        // Never contacted because the account exists.
        let network = network(Some("http://127.0.0.1:1/credit"));
        let client = network
            .setup_with(transport, "pw", Some(&path))
            .await
            .unwrap()
            .into_client();

        assert_eq!(client.sender_address(), wallet.address());
        assert_eq!(client.transport().account_lookups(), 1);
    }

    #[tokio::test]
    async fn empty_faucet_url_is_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.key");

        let client = network(Some(""))
            .setup_with(MockTransport::new(), "pw", Some(&path))
            .await
            .unwrap()
            .into_client();

        assert_eq!(client.transport().call_count(), 0);
    }

    #[tokio::test]
    async fn recover_mnemonic_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.key");
        let network = network(None);

        let first = network.recover_mnemonic("pw", Some(&path)).await.unwrap();
        let second = network.recover_mnemonic("pw", Some(&path)).await.unwrap();

        assert_eq!(first.phrase.split_whitespace().count(), 12);
        assert_eq!(*first.phrase, *second.phrase);
        assert!(first.durable && second.durable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unwritable_key_file_is_reported_as_not_durable() {
        let dir = tempfile::tempdir().unwrap();
        // Dangling symlink: reads as absent, cannot be written through.
        let path = dir.path().join("session.key");
        std::os::unix::fs::symlink(dir.path().join("missing").join("target"), &path).unwrap();
        let network = network(None);

        let session = network
            .setup_with(MockTransport::new(), "pw", Some(&path))
            .await
            .unwrap();
        assert!(!session.durable);
        assert!(session.client.sender_address().starts_with("cosmos1"));

        let recovered = network.recover_mnemonic("pw", Some(&path)).await.unwrap();
        assert!(!recovered.durable);
        assert_eq!(recovered.phrase.split_whitespace().count(), 12);
    }

    #[test]
    fn key_file_falls_back_to_default() {
        let network = network(None);
        assert_eq!(network.key_file(None), network.network().default_key_file.as_path());
        assert_eq!(network.key_file(Some(Path::new("/tmp/x.key"))), Path::new("/tmp/x.key"));
    }
}
