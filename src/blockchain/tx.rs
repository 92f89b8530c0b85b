//! Transaction envelope: messages, fee, sign doc and signed `StdTx`.
//!
//! # Responsibilities
//! - Build amino-JSON messages for wasm store/instantiate/execute and bank send
//! - Compute fees from the gas price and per-operation gas limits
//! - Produce canonical sign bytes (sorted keys, HTML-escaped) and sign them

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::types::{BlockchainResult, CodeId, Coin, UploadMeta};
use crate::blockchain::wallet::HdWallet;
use crate::config::GasPrice;

const PUBKEY_TYPE: &str = "tendermint/PubKeySecp256k1";

/// An amino-JSON message: `{"type": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Msg {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

impl Msg {
    pub fn store_code(sender: &str, wasm: &[u8], meta: &UploadMeta) -> Self {
        Self {
            kind: "wasm/MsgStoreCode".to_string(),
            value: serde_json::json!({
                "sender": sender,
                "wasm_byte_code": STANDARD.encode(wasm),
                "source": meta.source,
                "builder": meta.builder,
            }),
        }
    }

    pub fn instantiate_contract(
        sender: &str,
        code_id: CodeId,
        label: &str,
        init_msg: &Value,
        init_funds: &[Coin],
    ) -> Self {
        Self {
            kind: "wasm/MsgInstantiateContract".to_string(),
            value: serde_json::json!({
                "sender": sender,
                "code_id": code_id.to_string(),
                "label": label,
                "init_msg": init_msg,
                "init_funds": init_funds,
            }),
        }
    }

    /// Execute a contract. `msg` is the contract's message body; `sent_funds`
    /// travel next to it, never inside it.
    pub fn execute_contract(sender: &str, contract: &str, msg: &Value, sent_funds: &[Coin]) -> Self {
        Self {
            kind: "wasm/MsgExecuteContract".to_string(),
            value: serde_json::json!({
                "sender": sender,
                "contract": contract,
                "msg": msg,
                "sent_funds": sent_funds,
            }),
        }
    }

    pub fn send(from: &str, to: &str, amount: &[Coin]) -> Self {
        Self {
            kind: "cosmos-sdk/MsgSend".to_string(),
            value: serde_json::json!({
                "from_address": from,
                "to_address": to,
                "amount": amount,
            }),
        }
    }
}

/// Transaction fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    pub gas: String,
}

impl StdFee {
    /// Fee for `gas_limit` at `price`, rounded up.
    pub fn from_gas(price: &GasPrice, gas_limit: u64) -> Self {
        Self {
            amount: vec![Coin::new(price.fee_amount(gas_limit), price.denom.clone())],
            gas: gas_limit.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKey {
    #[serde(rename = "type")]
    pub kind: String,
    /// Base64 compressed public key.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignature {
    pub pub_key: PubKey,
    /// Base64 `r || s`.
    pub signature: String,
}

/// Signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdTx {
    pub msg: Vec<Msg>,
    pub fee: StdFee,
    pub signatures: Vec<StdSignature>,
    pub memo: String,
}

/// The document that gets signed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StdSignDoc<'a> {
    pub account_number: String,
    pub chain_id: &'a str,
    pub fee: &'a StdFee,
    pub memo: &'a str,
    pub msgs: &'a [Msg],
    pub sequence: String,
}

impl<'a> StdSignDoc<'a> {
    pub fn new(
        chain_id: &'a str,
        account_number: u64,
        sequence: u64,
        fee: &'a StdFee,
        msgs: &'a [Msg],
        memo: &'a str,
    ) -> Self {
        Self {
            account_number: account_number.to_string(),
            chain_id,
            fee,
            memo,
            msgs,
            sequence: sequence.to_string(),
        }
    }

    /// Canonical sign bytes: keys sorted at every level, no whitespace, and
    /// `&`, `<`, `>` escaped the way amino JSON does.
    pub fn sign_bytes(&self) -> BlockchainResult<Vec<u8>> {
        let sorted = sort_keys(serde_json::to_value(self)?);
        let json = serde_json::to_string(&sorted)?;
        Ok(escape_html(&json).into_bytes())
    }
}

/// Rebuild every object with its keys in lexicographic order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn escape_html(json: &str) -> String {
    json.replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

/// Sign `msgs` and wrap them into a broadcastable transaction.
pub fn sign_tx(
    wallet: &HdWallet,
    chain_id: &str,
    account_number: u64,
    sequence: u64,
    msgs: Vec<Msg>,
    fee: StdFee,
    memo: &str,
) -> BlockchainResult<StdTx> {
    let sign_doc = StdSignDoc::new(chain_id, account_number, sequence, &fee, &msgs, memo);
    let signature = wallet.sign(&sign_doc.sign_bytes()?);

    let std_signature = StdSignature {
        pub_key: PubKey {
            kind: PUBKEY_TYPE.to_string(),
            value: STANDARD.encode(wallet.pubkey()),
        },
        signature: STANDARD.encode(signature),
    };

    Ok(StdTx {
        msg: msgs,
        fee,
        signatures: vec![std_signature],
        memo: memo.to_string(),
    })
}
