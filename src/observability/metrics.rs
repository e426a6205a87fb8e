//! Metrics collection and exposition.
//!
//! # Metrics
//! - `intake_requests_total` (counter): requests by method, status
//! - `intake_request_duration_seconds` (histogram): latency distribution
//! - `intake_auth_failures_total` (counter): rejected callers by kind
//! - `intake_records_created_total` (counter): persisted client records
//! - `intake_audit_emit_failures_total` (counter): dropped audit records
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "intake_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("intake_request_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

pub fn record_auth_failure(kind: &'static str) {
    counter!("intake_auth_failures_total", "kind" => kind).increment(1);
}

pub fn record_created() {
    counter!("intake_records_created_total").increment(1);
}

pub fn record_audit_failure() {
    counter!("intake_audit_emit_failures_total").increment(1);
}
