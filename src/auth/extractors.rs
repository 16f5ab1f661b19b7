//! Axum extractors for authentication.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use super::types::AuthenticatedUser;
use crate::db::UserRole;

/// Extract the Bearer token from the `Authorization` header.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verify the Bearer token alone: signature and expiry, no revocation
/// check. Prefer [`authenticate_secure`]; this exists for call sites that
/// must accept tokens regardless of logout state.
pub fn authenticate<S>(parts: &Parts, state: &S) -> Result<AuthenticatedUser, AuthErrorKind>
where
    S: HasAuthBackend + Send + Sync,
{
    let token = bearer_token(parts).ok_or(AuthErrorKind::NotAuthenticated)?;

    let claims = state
        .jwt()
        .validate_access_token(token)
        .map_err(|_| AuthErrorKind::InvalidToken)?;

    Ok(AuthenticatedUser {
        claims,
        token: token.to_string(),
    })
}

/// As [`authenticate`], but revoked tokens fail too. The revocation check
/// runs first so a revoked token is rejected even before signature
/// validation. All extractors use this path.
fn authenticate_secure<S>(parts: &Parts, state: &S) -> Result<AuthenticatedUser, AuthErrorKind>
where
    S: HasAuthBackend + Send + Sync,
{
    if let Some(token) = bearer_token(parts) {
        if state.revocations().is_revoked(token) {
            return Err(AuthErrorKind::TokenRevoked);
        }
    }

    authenticate(parts, state)
}

/// Extractor for endpoints that require authentication.
/// Rejects with a 401 envelope when the token is missing, invalid, expired,
/// or revoked.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate_secure(parts, state)
            .map(Auth)
            .map_err(ApiAuthError::new)
    }
}

/// Optional authentication extractor - never fails, returns
/// `Option<AuthenticatedUser>`. Useful for endpoints that serve both
/// anonymous and authenticated callers.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(authenticate_secure(parts, state).ok()))
    }
}

/// Role set accepted by a [`RoleGuard`]. An empty set means any
/// authenticated principal.
pub trait RoleConstraint {
    const ALLOWED: &'static [UserRole];
}

/// Any authenticated principal.
pub struct AnyRole;

impl RoleConstraint for AnyRole {
    const ALLOWED: &'static [UserRole] = &[];
}

/// Admins only.
pub struct AdminOnly;

impl RoleConstraint for AdminOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::Admin];
}

/// Content staff: editors and admins.
pub struct Staff;

impl RoleConstraint for Staff {
    const ALLOWED: &'static [UserRole] = &[UserRole::Editor, UserRole::Admin];
}

/// Extractor enforcing a role constraint on top of authentication.
/// Missing/invalid tokens reject with 401; a valid principal whose role is
/// outside the constraint rejects with 403.
pub struct RoleGuard<C: RoleConstraint = AnyRole> {
    pub user: AuthenticatedUser,
    _constraint: PhantomData<C>,
}

impl<S, C> FromRequestParts<S> for RoleGuard<C>
where
    S: HasAuthBackend + Send + Sync,
    C: RoleConstraint,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticate_secure(parts, state).map_err(ApiAuthError::new)?;

        if !C::ALLOWED.is_empty() && !C::ALLOWED.contains(&user.claims.role) {
            return Err(ApiAuthError::new(AuthErrorKind::InsufficientRole));
        }

        Ok(RoleGuard {
            user,
            _constraint: PhantomData,
        })
    }
}
