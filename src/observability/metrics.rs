//! Metrics collection and exposition.
//!
//! # Metrics
//! - `flecha_requests_total` (counter): dispatched requests by method, route, status
//! - `flecha_request_duration_seconds` (histogram): pipeline latency by method, route
//!
//! # Design Decisions
//! - The `route` label is the wire template, never the concrete path, to bound cardinality
//! - Recording is a no-op until a recorder is installed

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one dispatched request.
pub fn record_request(method: &'static str, route: &str, status: u16, start: Instant) {
    let route = route.to_string();

    counter!(
        "flecha_requests_total",
        "method" => method,
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "flecha_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}
