//! Metrics collection and exposition.
//!
//! # Metrics
//! - `waf_requests_total` (counter): requests by method, status
//! - `waf_request_duration_seconds` (histogram): end-to-end latency
//! - `waf_blocked_total` (counter): signature blocks by category, location
//! - `waf_rate_limited_total` (counter): requests denied by the token bucket
//! - `waf_tracked_clients` (gauge): size of the client bucket table
//!
//! # Design Decisions
//! - Recording is a no-op until [`init_metrics`] installs a recorder
//! - A failed install is a startup error when metrics were requested
//! - Location labels use the kind only (`form-field`, not the field name)
//!   to keep label cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::inspection::Location;
use crate::security::Category;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "waf_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("waf_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_blocked(category: Category, location: &Location) {
    counter!(
        "waf_blocked_total",
        "category" => category.as_str(),
        "location" => location.kind()
    )
    .increment(1);
}

pub fn record_rate_limited() {
    counter!("waf_rate_limited_total").increment(1);
}

pub fn record_tracked_clients(count: usize) {
    gauge!("waf_tracked_clients").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_an_error() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        assert!(init_metrics(addr).is_ok());

        let err = init_metrics(addr).unwrap_err();
        assert!(matches!(err, BuildError::FailedToSetGlobalRecorder(_)));
    }
}
