//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by outcome and status
//! - `proxy_request_duration_seconds` (histogram): latency by outcome
//! - `proxy_invalid_patterns_total` (counter): User-Agent patterns skipped at load
//! - `proxy_config_reloads_total` (counter): snapshot swaps by result
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request. `outcome` is `forwarded` or a rejection reason.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_invalid_pattern() {
    metrics::counter!("proxy_invalid_patterns_total").increment(1);
}

pub fn record_reload(success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("proxy_config_reloads_total", "result" => result).increment(1);
}
