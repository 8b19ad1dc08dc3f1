//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_api_calls_total` (counter): calls by service, method, result code
//! - `bridge_api_call_duration_seconds` (histogram): call latency
//! - `bridge_log_flushes_total` (counter): background flushes by outcome
//! - `bridge_log_lines_flushed_total` (counter): log lines shipped
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exposition only when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one API call. `code` is "OK" or an error code name.
pub fn record_call(service: &str, method: &str, code: &'static str, start: Instant) {
    ::metrics::counter!(
        "bridge_api_calls_total",
        "service" => service.to_string(),
        "method" => method.to_string(),
        "code" => code
    )
    .increment(1);

    ::metrics::histogram!(
        "bridge_api_call_duration_seconds",
        "service" => service.to_string(),
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a finished background log flush.
pub fn record_flush(outcome: &'static str, lines: usize) {
    ::metrics::counter!("bridge_log_flushes_total", "outcome" => outcome).increment(1);
    ::metrics::counter!("bridge_log_lines_flushed_total").increment(lines as u64);
}
