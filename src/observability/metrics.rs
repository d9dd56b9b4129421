//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ingress_renders_total` (counter): rendered documents by result
//! - `ingress_annotation_denials_total` (counter): denied features by parser
//! - `ingress_backend_slots` (gauge): slot capacity per backend
//! - `ingress_backend_slots_used` (gauge): bound slots per backend
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is installed by the binary, never by the library

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_render(result: &'static str) {
    metrics::counter!("ingress_renders_total", "result" => result).increment(1);
}

pub fn record_annotation_denial(parser: &'static str) {
    metrics::counter!("ingress_annotation_denials_total", "parser" => parser).increment(1);
}

pub fn record_backend_slots(backend: &str, capacity: usize, used: usize) {
    metrics::gauge!("ingress_backend_slots", "backend" => backend.to_string()).set(capacity as f64);
    metrics::gauge!("ingress_backend_slots_used", "backend" => backend.to_string()).set(used as f64);
}
