//! Client identification from the connection's peer address.
//!
//! The identifier is the peer IP without the port. When no peer address is
//! attached to the request, every such client shares the `unknown` identifier
//! and therefore one rate-limit allowance.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Rate-limit key and audit identity of a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Shared identifier for clients whose address cannot be determined.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn from_ip(ip: IpAddr) -> Self {
        // IPv4-mapped IPv6 peers share a bucket with their IPv4 form.
        Self(ip.to_canonical().to_string())
    }

    pub fn from_peer(peer: Option<SocketAddr>) -> Self {
        peer.map(|addr| Self::from_ip(addr.ip()))
            .unwrap_or_else(Self::unknown)
    }

    /// Derive the identifier from the `ConnectInfo` attached by the server.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        Self::from_peer(peer)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
