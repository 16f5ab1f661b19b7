//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::envelope;

/// Internal auth error kind used by the core authentication logic.
///
/// Expired, revoked, and malformed tokens are distinguishable here but all
/// collapse to the same 401 at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    NotAuthenticated,
    InvalidToken,
    TokenRevoked,
    InsufficientRole,
}

/// Authentication rejection returned by the extractors.
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    fn status_code(&self) -> StatusCode {
        match self.kind {
            AuthErrorKind::NotAuthenticated
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthErrorKind::InsufficientRole => StatusCode::FORBIDDEN,
        }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            // One message for every 401 kind - the boundary does not reveal
            // whether a token was missing, malformed, expired, or revoked.
            AuthErrorKind::NotAuthenticated
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::TokenRevoked => "Authentication required",
            AuthErrorKind::InsufficientRole => "Permission denied",
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(envelope::error(status, self.message()))).into_response()
    }
}
