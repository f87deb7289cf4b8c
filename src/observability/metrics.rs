//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): latency by endpoint
//! - `gateway_rpc_calls_total` (counter): upstream calls by method, outcome
//! - `gateway_accounts_created_total` (counter)
//! - `gateway_transactions_total` (counter): transfers by outcome
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled HTTP request.
pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream JSON-RPC call.
pub fn record_rpc_call(method: &str, outcome: &'static str) {
    counter!(
        "gateway_rpc_calls_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_account_created() {
    counter!("gateway_accounts_created_total").increment(1);
}

/// Record a transfer attempt; `outcome` is `submitted` or an error kind.
pub fn record_transaction(outcome: &'static str) {
    counter!("gateway_transactions_total", "outcome" => outcome).increment(1);
}
