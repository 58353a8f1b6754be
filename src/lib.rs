//! Inline HTTP traffic inspector.
//!
//! Sits between clients and an upstream web application. Each request is
//! rate limited per client, its query string and body (raw, form fields and
//! JSON string leaves) are matched against built-in attack signatures, and
//! clean requests are relayed upstream with their body byte-for-byte intact.

pub mod config;
pub mod error;
pub mod http;
pub mod inspection;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::WafConfig;
pub use error::WafError;
pub use http::WafServer;
pub use lifecycle::Shutdown;
