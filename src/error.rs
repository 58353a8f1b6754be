//! Crate-level startup errors.

use std::net::AddrParseError;

use axum::http::uri::InvalidUri;
use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that prevent the inspector from starting.
#[derive(Debug, Error)]
pub enum WafError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to compile signature set: {0}")]
    Signatures(#[from] regex::Error),

    #[error("invalid upstream address '{address}': {source}")]
    InvalidUpstream {
        address: String,
        #[source]
        source: InvalidUri,
    },

    #[error("invalid metrics address '{address}': {source}")]
    InvalidMetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
