//! Client IP extraction for rate limiting.

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::request::Parts};

/// Extract the client IP used as a rate-limit identifier.
///
/// The first hop of `X-Forwarded-For` wins (the deployment sits behind a
/// reverse proxy), falling back to the socket peer address, then "unknown".
pub fn extract_client_ip(parts: &Parts) -> String {
    if let Some(forwarded_for) = parts.headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded_for.to_str() {
            if let Some(first_ip) = value.split(',').next() {
                let ip = first_ip.trim();
                if !ip.is_empty() {
                    return ip.to_string();
                }
            }
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Extractor form of [`extract_client_ip`]. Never fails.
pub struct ClientIp(pub String);

impl<S> axum::extract::FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(extract_client_ip(parts)))
    }
}
