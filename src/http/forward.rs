//! Relay of allowed requests to the upstream application.
//!
//! # Responsibilities
//! - Rewrite the request URI to `http://<upstream>/<original path and query>`
//! - Pass method, headers (including Host) and body through
//! - Strip hop-by-hop headers and append the client to `X-Forwarded-For`
//! - Stream the upstream response back without touching status or body
//!
//! # Design Decisions
//! - No retries; upstream failures surface as 502, a stalled upstream as 504
//! - Outgoing requests are HTTP/1.1 regardless of the inbound version

use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, InvalidUri, InvalidUriParts, PathAndQuery, Scheme};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response, Uri, Version};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::net::ClientId;

/// Headers that describe a single connection and are never relayed.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Errors produced while relaying to the upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build upstream URI: {0}")]
    Uri(#[from] InvalidUriParts),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Relays requests to a single upstream over plain HTTP.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    authority: Authority,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, InvalidUri> {
        let authority = config.address.parse::<Authority>()?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            authority,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Send `request` upstream and return its response.
    pub async fn forward(
        &self,
        client: &ClientId,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        let (mut parts, body) = request.into_parts();

        parts.uri = self.upstream_uri(&parts.uri)?;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        append_forwarded_for(&mut parts.headers, client);

        tracing::debug!(client = %client, uri = %parts.uri, method = %parts.method, "Forwarding request");

        let request = Request::from_parts(parts, body);
        let response: Response<Incoming> = tokio::time::timeout(self.request_timeout, self.client.request(request))
            .await
            .map_err(|_| ForwardError::Timeout(self.request_timeout))??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }

    fn upstream_uri(&self, original: &Uri) -> Result<Uri, InvalidUriParts> {
        let mut uri_parts = original.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(uri_parts)
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, client: &ClientId) {
    if client.as_str() == ClientId::UNKNOWN {
        return;
    }

    let value = match headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{}, {}", prior, client),
        None => client.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert("x-forwarded-for", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarder() -> Forwarder {
        Forwarder::new(&UpstreamConfig::default()).unwrap()
    }

    #[test]
    fn rewrites_scheme_and_authority_only() {
        let original: Uri = "/search?q=rust&page=2".parse().unwrap();
        let uri = forwarder().upstream_uri(&original).unwrap();
        assert_eq!(uri.to_string(), "http://127.0.0.1:8080/search?q=rust&page=2");

        let absolute: Uri = "http://public.example/a".parse().unwrap();
        let uri = forwarder().upstream_uri(&absolute).unwrap();
        assert_eq!(uri.to_string(), "http://127.0.0.1:8080/a");
    }

    #[test]
    fn invalid_upstream_address_is_rejected() {
        let config = UpstreamConfig {
            address: "not a host".into(),
            ..UpstreamConfig::default()
        };
        assert!(Forwarder::new(&config).is_err());
    }

    #[test]
    fn strips_hop_by_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-session-hop"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-session-hop", HeaderValue::from_static("1"));
        headers.insert(header::HOST, HeaderValue::from_static("shop.example"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("x-session-hop").is_none());
        assert_eq!(headers[header::HOST], "shop.example");
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn forwarded_for_is_appended() {
        let client = ClientId::from_peer(Some("198.51.100.4:1234".parse().unwrap()));

        let mut headers = HeaderMap::new();
        append_forwarded_for(&mut headers, &client);
        assert_eq!(headers["x-forwarded-for"], "198.51.100.4");

        append_forwarded_for(&mut headers, &client);
        assert_eq!(headers["x-forwarded-for"], "198.51.100.4, 198.51.100.4");

        let mut untouched = HeaderMap::new();
        append_forwarded_for(&mut untouched, &ClientId::unknown());
        assert!(untouched.is_empty());
    }
}
