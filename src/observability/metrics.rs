//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): proxied requests by method, status
//! - `relay_request_duration_seconds` (histogram): proxy latency
//! - `relay_html_injections_total` (counter): responses that got the snippet
//! - `relay_broadcasts_total` (counter): reload triggers
//! - `relay_broadcast_deliveries_total` (counter): signals written
//! - `relay_broadcast_failures_total` (counter): connections dropped on send
//! - `relay_registered_connections` (gauge): current registry size
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("relay_request_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

pub fn record_injection() {
    counter!("relay_html_injections_total").increment(1);
}

pub fn record_broadcast(delivered: usize, removed: usize) {
    counter!("relay_broadcasts_total").increment(1);
    counter!("relay_broadcast_deliveries_total").increment(delivered as u64);
    counter!("relay_broadcast_failures_total").increment(removed as u64);
}

pub fn record_registered_connections(count: usize) {
    gauge!("relay_registered_connections").set(count as f64);
}
