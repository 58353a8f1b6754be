//! Read-once request body buffering.
//!
//! The incoming body stream is consumed exactly once into an owned `Bytes`.
//! Every fragment is derived from that buffer, and [`BufferedRequest::into_request`]
//! attaches a fresh body over the same bytes for forwarding. `Bytes` clones are
//! reference-counted, so restoration never copies the payload.

use axum::body::Body;
use axum::http::{header, request::Parts, Request};
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use thiserror::Error;

/// Failure to buffer a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The body exceeded the configured inspection limit.
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The client stream failed before the body was complete.
    #[error("failed to read request body: {0}")]
    Read(String),
}

/// A request whose body has been read fully into memory.
#[derive(Debug)]
pub struct BufferedRequest {
    parts: Parts,
    body: Bytes,
}

impl BufferedRequest {
    /// Consume the request body. With a `limit`, reading stops with
    /// [`BodyError::TooLarge`] once more than `limit` bytes arrive.
    pub async fn read(request: Request<Body>, limit: Option<usize>) -> Result<Self, BodyError> {
        let (parts, body) = request.into_parts();

        let body = match limit {
            Some(limit) => match Limited::new(body, limit).collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                    return Err(BodyError::TooLarge { limit });
                }
                Err(e) => return Err(BodyError::Read(e.to_string())),
            },
            None => body
                .collect()
                .await
                .map_err(|e| BodyError::Read(e.to_string()))?
                .to_bytes(),
        };

        Ok(Self { parts, body })
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The declared `Content-Type`, if present and valid text.
    pub fn content_type(&self) -> Option<&str> {
        self.parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Re-attach the buffered bytes as a new body.
    pub fn into_request(self) -> Request<Body> {
        Request::from_parts(self.parts, Body::from(self.body))
    }
}
