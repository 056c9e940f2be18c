//! Metrics collection and exposition.
//!
//! # Metrics
//! - `admin_requests_total` (counter): API requests by method, route, status
//! - `admin_request_duration_seconds` (histogram): API latency
//! - `admin_upstream_requests_total` (counter): admin API calls by outcome
//! - `admin_upstream_duration_seconds` (histogram): admin API latency
//! - `admin_enrich_records_total` / `admin_enrich_degraded_total` (counters)
//! - `admin_sessions_active` (gauge)
//! - `admin_config_reloads_total` (counter): cache reloads by outcome
//!
//! Recording is a no-op until a recorder is installed, so unit tests and
//! deployments with metrics disabled pay nothing beyond the call.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let route = route.to_string();
    let status = status.to_string();
    counter!(
        "admin_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    histogram!("admin_request_duration_seconds", "method" => method, "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream(outcome: &'static str, start: Instant) {
    counter!("admin_upstream_requests_total", "outcome" => outcome).increment(1);
    histogram!("admin_upstream_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_enrichment(total: usize, degraded: usize) {
    counter!("admin_enrich_records_total").increment(total as u64);
    if degraded > 0 {
        counter!("admin_enrich_degraded_total").increment(degraded as u64);
    }
}

pub fn record_active_sessions(count: usize) {
    gauge!("admin_sessions_active").set(count as f64);
}

pub fn record_config_reload(outcome: &'static str) {
    counter!("admin_config_reloads_total", "outcome" => outcome).increment(1);
}
