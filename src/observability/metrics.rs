//! Metrics collection.
//!
//! # Metrics
//! - `counter_rpc_requests_total` (counter): RPC calls by method, outcome
//! - `counter_transactions_submitted_total` (counter): accepted submissions
//! - `counter_confirmation_wait_seconds` (histogram): wait time by outcome
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; no-ops until an embedder
//!   installs a recorder
//! - The binary installs none, a single run is too short to scrape

use std::time::Duration;

/// Record the outcome of one RPC call.
pub fn record_rpc(method: &'static str, outcome: &'static str) {
    metrics::counter!(
        "counter_rpc_requests_total",
        "method" => method,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a transaction accepted into the node's pool.
pub fn record_submission() {
    metrics::counter!("counter_transactions_submitted_total").increment(1);
}

/// Record how long a confirmation wait took and how it ended.
pub fn record_confirmation_wait(outcome: &'static str, elapsed: Duration) {
    metrics::histogram!("counter_confirmation_wait_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}
