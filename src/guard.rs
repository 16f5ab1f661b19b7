//! Transport-level request validation.
//!
//! Checks User-Agent, Content-Type, and Content-Length before a request
//! reaches route handlers. Failures block mutating methods with a 400 but
//! are only logged for reads - callers relying on that asymmetry include
//! server-rendered pages that fetch without a browser User-Agent.

use axum::{
    extract::Request,
    http::{Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::ApiError;

/// Maximum accepted Content-Length: 10 MiB.
const MAX_CONTENT_LENGTH: u64 = 10 * 1024 * 1024;

/// Minimum plausible User-Agent length.
const MIN_USER_AGENT_LENGTH: usize = 5;

/// Outcome of validating a request's transport properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestValidation {
    pub is_valid: bool,
    pub error: Option<&'static str>,
}

impl RequestValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(error: &'static str) -> Self {
        Self {
            is_valid: false,
            error: Some(error),
        }
    }
}

/// Validate the transport-level properties of a request.
pub fn validate_request(method: &Method, headers: &axum::http::HeaderMap) -> RequestValidation {
    match headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        // Server-side callers often send no User-Agent at all
        None => warn!("User-Agent not found in request headers"),
        Some(ua) if ua.len() < MIN_USER_AGENT_LENGTH => {
            return RequestValidation::invalid("Invalid User-Agent");
        }
        Some(_) => {}
    }

    if is_mutating(method) {
        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        if !is_json {
            return RequestValidation::invalid("Content-Type must be application/json");
        }
    }

    if let Some(length) = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        if length > MAX_CONTENT_LENGTH {
            return RequestValidation::invalid("Request too large");
        }
    }

    RequestValidation::valid()
}

fn is_mutating(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Middleware applying [`validate_request`] to every API request.
///
/// Mutating methods are rejected with 400; reads proceed with a warning.
pub async fn guard_request(request: Request, next: Next) -> Response {
    let validation = validate_request(request.method(), request.headers());

    if let Some(error) = validation.error {
        if is_mutating(request.method()) {
            return ApiError::bad_request(error).into_response();
        }
        warn!(
            method = %request.method(),
            uri = %request.uri(),
            error,
            "Request validation failed, proceeding for non-mutating method"
        );
    }

    next.run(request).await
}
