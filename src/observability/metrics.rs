//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define request metrics (count, latency, negotiated formats)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `restmux_requests_total` (counter): requests by method, status, format
//! - `restmux_request_duration_seconds` (histogram): latency distribution
//! - `restmux_negotiated_total` (counter): chosen encoder by selection source
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels stay low-cardinality: no paths, no request IDs

use std::net::SocketAddr;
use std::time::Instant;

use metrics::Label;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, format: &str, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("status", status.to_string()),
        Label::new("format", format.to_string()),
    ];
    metrics::counter!("restmux_requests_total", labels.clone()).increment(1);
    metrics::histogram!("restmux_request_duration_seconds", labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record which encoder negotiation picked and what picked it.
pub fn record_negotiation(format: &str, source: &str) {
    metrics::counter!(
        "restmux_negotiated_total",
        "format" => format.to_string(),
        "source" => source.to_string()
    )
    .increment(1);
}
