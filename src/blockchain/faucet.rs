//! Faucet bootstrap for fresh accounts.
//!
//! An account that already exists on chain is left alone. Otherwise a single
//! credit request is sent to the faucet; there is no retry and no polling
//! for the funds to arrive.

use std::time::Duration;

use serde::Serialize;

use crate::blockchain::client::SigningClient;
use crate::blockchain::transport::ChainTransport;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::observability::metrics;

/// What [`ensure_funded`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaucetOutcome {
    /// The account exists; no request was sent.
    AlreadyFunded,
    /// The faucet accepted a credit request.
    Credited,
}

#[derive(Debug, Serialize)]
struct CreditRequest<'a> {
    denom: &'a str,
    address: &'a str,
}

/// Make sure the client's sender has an on-chain account.
pub async fn ensure_funded<T: ChainTransport>(
    client: &SigningClient<T>,
    faucet_url: &str,
    fee_token: &str,
) -> BlockchainResult<FaucetOutcome> {
    let address = client.sender_address();
    if client.get_account().await?.is_some() {
        tracing::debug!(address, "Account already funded, skipping faucet");
        return Ok(FaucetOutcome::AlreadyFunded);
    }

    let url = url::Url::parse(faucet_url).map_err(|e| BlockchainError::InvalidUrl {
        url: faucet_url.to_string(),
        reason: e.to_string(),
    })?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(client.config().request_timeout_secs))
        .build()?;

    tracing::info!(address, faucet = %url, denom = fee_token, "Requesting tokens from faucet");
    let response = http
        .post(url)
        .json(&CreditRequest {
            denom: fee_token,
            address,
        })
        .send()
        .await;

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            metrics::record_faucet_request(false);
            return Err(e.into());
        }
    };

    let status = response.status();
    if !status.is_success() {
        metrics::record_faucet_request(false);
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(address, status = status.as_u16(), body = %body, "Faucet refused credit");
        return Err(BlockchainError::Faucet {
            status: status.as_u16(),
            body,
        });
    }

    metrics::record_faucet_request(true);
    tracing::info!(address, "Faucet credited account");
    Ok(FaucetOutcome::Credited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transport::MockTransport;
    use crate::blockchain::types::AccountInfo;
    use crate::blockchain::wallet::HdWallet;
    use crate::config::NetworkConfig;

    #[tokio::test]
    async fn funded_account_skips_faucet() {
        let config = NetworkConfig::default();
        let wallet = HdWallet::generate(&config.hd_path, "cosmos").unwrap();
        let transport = MockTransport::with_account(AccountInfo {
            address: wallet.address().to_string(),
            account_number: 1,
            sequence: 0,
            balance: Vec::new(),
        });
        let client = SigningClient::connect(wallet, &config, transport);

        // The URL is never dialled, so an unroutable one is fine.
        let outcome = ensure_funded(&client, "http://127.0.0.1:1/credit", "ucosm")
            .await
            .unwrap();

        assert_eq!(outcome, FaucetOutcome::AlreadyFunded);
        assert!(client.transport().broadcasts().is_empty());
    }

    #[tokio::test]
    async fn invalid_faucet_url_is_reported() {
        let config = NetworkConfig::default();
        let wallet = HdWallet::generate(&config.hd_path, "cosmos").unwrap();
        let client = SigningClient::connect(wallet, &config, MockTransport::new());

        let result = ensure_funded(&client, "::not-a-url", "ucosm").await;
        assert!(matches!(result, Err(BlockchainError::InvalidUrl { .. })));
    }
}
