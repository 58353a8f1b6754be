//! Responses produced by the inspector itself.
//!
//! Policy rejections carry a minimal plain-text body. Everything else the
//! client sees comes from the upstream.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::forward::ForwardError;
use crate::inspection::BodyError;

/// 429 for a client that has spent its allowance.
pub fn too_many_requests() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
}

/// 403 for a request carrying an attack signature.
pub fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

impl IntoResponse for BodyError {
    fn into_response(self) -> Response {
        match self {
            BodyError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large").into_response(),
            BodyError::Read(_) => (StatusCode::BAD_REQUEST, "Failed to read request body").into_response(),
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            ForwardError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "Gateway timeout").into_response(),
            ForwardError::Uri(_) | ForwardError::Upstream(_) => {
                (StatusCode::BAD_GATEWAY, "Bad gateway").into_response()
            }
        }
    }
}
