//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the inspector.
//! All types derive Serde traits for deserialization from config files, and
//! every default reproduces the built-in behaviour (listen on 8081, forward to
//! 127.0.0.1:8080, 10 tokens refilled at 1 token/s).

use serde::{Deserialize, Serialize};

/// Root configuration for the inspecting proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WafConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream application that allowed traffic is relayed to.
    pub upstream: UpstreamConfig,

    /// Per-client token bucket settings.
    pub rate_limit: RateLimitConfig,

    /// Request content inspection settings.
    pub inspection: InspectionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream authority (`host:port`). The scheme is always plain HTTP.
    pub address: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Upper bound on waiting for the upstream response head, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Bucket capacity (maximum burst) per client.
    pub capacity: f64,

    /// Tokens regained per second of idle time.
    pub refill_per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 10.0,
            refill_per_second: 1.0,
        }
    }
}

/// Content inspection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InspectionConfig {
    /// Methods whose bodies are buffered and inspected.
    pub body_methods: Vec<String>,

    /// Optional cap in bytes on buffered bodies. Unset means bodies of any
    /// size are inspected and forwarded.
    pub max_body_size: Option<usize>,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            body_methods: vec!["POST".to_string(), "PUT".to_string(), "PATCH".to_string()],
            max_body_size: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
