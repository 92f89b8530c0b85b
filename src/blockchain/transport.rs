//! Chain transport abstraction.
//!
//! The signing client never talks to the network directly; it goes through
//! [`ChainTransport`]. Production code uses [`LcdTransport`](crate::blockchain::lcd::LcdTransport),
//! tests use [`MockTransport`].
//!
//! A transport performs a single attempt per call. It does not retry, sleep
//! or reinterpret the endpoint's answer; a non-zero result code in a
//! [`TxResponse`] is returned as-is and judged by the caller.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::blockchain::tx::StdTx;
use crate::blockchain::types::{AccountInfo, BlockchainError, BlockchainResult, TxResponse};

/// The three primitive operations a chain endpoint offers.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// Account record for `address`, or `None` if the chain has never seen it.
    async fn get_account(&self, address: &str) -> BlockchainResult<Option<AccountInfo>>;

    /// Run a read-only smart query against `contract`.
    async fn query_smart(&self, contract: &str, query: &Value) -> BlockchainResult<Value>;

    /// Submit a signed transaction and wait for it to be included.
    async fn broadcast(&self, tx: &StdTx) -> BlockchainResult<TxResponse>;
}

#[derive(Default)]
struct MockState {
    account: Option<AccountInfo>,
    query_responses: VecDeque<Value>,
    tx_responses: VecDeque<TxResponse>,
    account_lookups: usize,
    queries: Vec<(String, Value)>,
    broadcasts: Vec<StdTx>,
}

/// In-memory transport for tests.
///
/// Query and broadcast responses are consumed FIFO. With no queued
/// broadcast response a successful one is synthesized with the hash
/// `MOCKHASH{n}`, `n` counting from 1. With no queued query response the
/// query fails. Every call is recorded.
///
/// A poisoned mutex is reported as a transport error, never a panic. The
/// counters and logs read as empty in that case.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that knows `account`.
    #[must_use]
    pub fn with_account(account: AccountInfo) -> Self {
        Self {
            state: Mutex::new(MockState {
                account: Some(account),
                ..MockState::default()
            }),
        }
    }

    pub fn set_account(&self, account: Option<AccountInfo>) -> BlockchainResult<()> {
        self.lock_state()?.account = account;
        Ok(())
    }

    pub fn push_query_response(&self, response: Value) -> BlockchainResult<()> {
        self.lock_state()?.query_responses.push_back(response);
        Ok(())
    }

    pub fn push_tx_response(&self, response: TxResponse) -> BlockchainResult<()> {
        self.lock_state()?.tx_responses.push_back(response);
        Ok(())
    }

    /// Number of `get_account` calls so far.
    pub fn account_lookups(&self) -> usize {
        self.state.lock().map(|s| s.account_lookups).unwrap_or(0)
    }

    /// Every smart query so far, as `(contract, query)`.
    pub fn queries(&self) -> Vec<(String, Value)> {
        self.state.lock().map(|s| s.queries.clone()).unwrap_or_default()
    }

    /// Every transaction broadcast so far.
    pub fn broadcasts(&self) -> Vec<StdTx> {
        self.state.lock().map(|s| s.broadcasts.clone()).unwrap_or_default()
    }

    /// Total number of calls of any kind.
    pub fn call_count(&self) -> usize {
        self.state
            .lock()
            .map(|s| s.account_lookups + s.queries.len() + s.broadcasts.len())
            .unwrap_or(0)
    }

    fn lock_state(&self) -> BlockchainResult<MutexGuard<'_, MockState>> {
        self.state.lock().map_err(|e| BlockchainError::Transport {
            status: 0,
            body: format!("mutex poisoned: {e}"),
        })
    }
}

#[async_trait]
impl ChainTransport for MockTransport {
    async fn get_account(&self, address: &str) -> BlockchainResult<Option<AccountInfo>> {
        let mut state = self.lock_state()?;
        state.account_lookups += 1;
        Ok(state.account.clone().filter(|a| a.address == address))
    }

    async fn query_smart(&self, contract: &str, query: &Value) -> BlockchainResult<Value> {
        let mut state = self.lock_state()?;
        state.queries.push((contract.to_string(), query.clone()));
        state.query_responses.pop_front().ok_or_else(|| BlockchainError::Transport {
            status: 500,
            body: "no mock query response".to_string(),
        })
    }

    async fn broadcast(&self, tx: &StdTx) -> BlockchainResult<TxResponse> {
        let mut state = self.lock_state()?;
        state.broadcasts.push(tx.clone());
        let n = state.broadcasts.len();

        if let Some(account) = state.account.as_mut() {
            account.sequence += 1;
        }

        Ok(state.tx_responses.pop_front().unwrap_or_else(|| TxResponse {
            height: n as u64,
            txhash: format!("MOCKHASH{n}"),
            code: 0,
            raw_log: String::new(),
            logs: Vec::new(),
        }))
    }
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<MockTransport>();
    }
    let _ = check;
};
