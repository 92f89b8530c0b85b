//! Metrics collection.
//!
//! # Metrics
//! - `qf_tx_broadcast_total` (counter): broadcasts by kind, outcome
//! - `qf_contract_query_total` (counter): smart queries by outcome
//! - `qf_faucet_requests_total` (counter): faucet hits by outcome
//! - `qf_bytecode_download_bytes` (histogram): fetched artifact sizes
//!
//! No exporter is installed here; without a recorder the calls are no-ops.

use metrics::{counter, histogram};

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Record a transaction broadcast.
pub fn record_broadcast(kind: &'static str, success: bool) {
    counter!("qf_tx_broadcast_total", "kind" => kind, "outcome" => outcome(success)).increment(1);
}

/// Record a contract smart query.
pub fn record_query(success: bool) {
    counter!("qf_contract_query_total", "outcome" => outcome(success)).increment(1);
}

/// Record a faucet request.
pub fn record_faucet_request(success: bool) {
    counter!("qf_faucet_requests_total", "outcome" => outcome(success)).increment(1);
}

/// Record the size of a downloaded bytecode artifact.
pub fn record_bytecode_download(bytes: usize) {
    histogram!("qf_bytecode_download_bytes").record(bytes as f64);
}
