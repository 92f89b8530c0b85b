//! Contract factory and instance end to end over a mock chain.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use qf_client::blockchain::types::{Attribute, Event, TxLog};
use qf_client::blockchain::{BlockchainError, Coin, TxResponse};
use qf_client::config::{ContractSourceConfig, NetworkConfig};
use qf_client::contract::{Expiration, InitMsg, QfAlgorithm, QuadraticFunding};

mod common;

const WASM: &[u8] = b"\0asm\x01\0\0\0";

fn committed(key: &str, value: &str) -> TxResponse {
    TxResponse {
        height: 100,
        txhash: format!("TX-{key}"),
        code: 0,
        raw_log: String::new(),
        logs: vec![TxLog {
            msg_index: 0,
            events: vec![Event {
                kind: "message".to_string(),
                attributes: vec![
                    Attribute { key: "module".into(), value: "wasm".into() },
                    Attribute { key: key.into(), value: value.into() },
                ],
            }],
        }],
    }
}

fn source(url: String) -> ContractSourceConfig {
    ContractSourceConfig {
        wasm_url: url,
        ..ContractSourceConfig::default()
    }
}

#[tokio::test]
async fn test_upload_submits_artifact_with_provenance() {
    let artifact = common::start_mock_backend(200, WASM).await;
    let client = Arc::new(common::funded_client(&NetworkConfig::default()));
    client.transport().push_tx_response(committed("code_id", "12")).unwrap();
    let factory = QuadraticFunding::new(client.clone(), source(artifact.url("/contract.wasm"))).unwrap();

    let code_id = factory.upload().await.unwrap();

    assert_eq!(code_id, 12);
    assert_eq!(artifact.hits(), 1);
    let broadcasts = client.transport().broadcasts();
    assert_eq!(broadcasts.len(), 1);
    let msg = &broadcasts[0].msg[0];
    assert_eq!(msg.kind, "wasm/MsgStoreCode");
    assert_eq!(msg.value["wasm_byte_code"], STANDARD.encode(WASM));
    assert_eq!(msg.value["source"], ContractSourceConfig::default().source);
    assert_eq!(msg.value["builder"], "cosmwasm/rust-optimizer:0.10.4");
}

#[tokio::test]
async fn test_upload_download_failure_never_broadcasts() {
    let artifact = common::start_mock_backend(404, "missing").await;
    let client = Arc::new(common::funded_client(&NetworkConfig::default()));
    let factory = QuadraticFunding::new(client.clone(), source(artifact.url("/contract.wasm"))).unwrap();

    let result = factory.upload().await;

    match result {
        Err(BlockchainError::Download { url, status }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/contract.wasm"));
        }
        other => panic!("expected download error, got {other:?}"),
    }
    assert_eq!(artifact.hits(), 1);
    assert!(client.transport().broadcasts().is_empty());
    assert_eq!(client.transport().account_lookups(), 0);
}

#[tokio::test]
async fn test_upload_requires_exactly_200() {
    for status in [201, 204] {
        let body: &[u8] = if status == 204 { b"" } else { WASM };
        let artifact = common::start_mock_backend(status, body).await;
        let client = Arc::new(common::funded_client(&NetworkConfig::default()));
        let factory =
            QuadraticFunding::new(client.clone(), source(artifact.url("/contract.wasm"))).unwrap();

        let result = factory.upload().await;

        match result {
            Err(BlockchainError::Download { status: got, .. }) => assert_eq!(got, status),
            other => panic!("expected download error for {status}, got {other:?}"),
        }
        assert_eq!(artifact.hits(), 1);
        assert!(client.transport().broadcasts().is_empty());
    }
}

#[tokio::test]
async fn test_instantiate_then_vote() {
    let client = Arc::new(common::funded_client(&NetworkConfig::default()));
    client
        .transport()
        .push_tx_response(committed("contract_address", "cosmos1qfcontract")).unwrap();
    let factory = QuadraticFunding::new(client.clone(), ContractSourceConfig::default()).unwrap();

    let init = InitMsg {
        admin: client.sender_address().to_string(),
        create_proposal_whitelist: None,
        vote_proposal_whitelist: None,
        voting_period: Expiration::AtHeight(257_600),
        proposal_period: Expiration::AtHeight(257_600),
        budget_denom: "ucosm".to_string(),
        algorithm: QfAlgorithm(serde_json::json!({
            "capital_constrained_liberal_radicalism": {"parameter": ""}
        })),
    };
    let instance = factory.instantiate(90, &init, "qf test").await.unwrap();
    assert_eq!(instance.contract_address(), "cosmos1qfcontract");

    let hash = instance
        .vote_proposal(7, &[Coin::new(100, "ucosm")])
        .await
        .unwrap();
    assert_eq!(hash, "MOCKHASH2");

    let broadcasts = client.transport().broadcasts();
    assert_eq!(broadcasts.len(), 2);
    assert_eq!(broadcasts[0].memo, "Init qf test");
    let vote = &broadcasts[1].msg[0].value;
    assert_eq!(vote["contract"], "cosmos1qfcontract");
    assert_eq!(vote["msg"], serde_json::json!({"vote": {"proposalId": 7}}));
    assert_eq!(
        vote["sent_funds"],
        serde_json::json!([{"denom": "ucosm", "amount": "100"}])
    );
}

#[tokio::test]
async fn test_attach_makes_no_calls() {
    let client = Arc::new(common::funded_client(&NetworkConfig::default()));
    let factory = QuadraticFunding::new(client.clone(), ContractSourceConfig::default()).unwrap();

    let instance = factory.attach("addr123");

    assert_eq!(instance.contract_address(), "addr123");
    assert_eq!(client.transport().call_count(), 0);
}

#[tokio::test]
async fn test_one_broadcast_per_action_none_per_query() {
    let client = Arc::new(common::funded_client(&NetworkConfig::default()));
    let factory = QuadraticFunding::new(client.clone(), ContractSourceConfig::default()).unwrap();
    let instance = factory.attach("cosmos1qf");
    client.transport().push_query_response(serde_json::json!({
        "id": 1, "title": "t", "description": "d", "fund_address": "cosmos1fund"
    })).unwrap();

    instance.proposal(1).await.unwrap();
    assert_eq!(client.transport().broadcasts().len(), 0);

    instance
        .create_proposal("n", "t", "d", "cosmos1fund", &[Coin::new(1, "ucosm")], None)
        .await
        .unwrap();
    instance.trigger_distribution().await.unwrap();

    assert_eq!(client.transport().broadcasts().len(), 2);
    assert_eq!(client.transport().queries().len(), 1);
}
