//! Authentication API endpoints.
//!
//! - POST `/register` - Create an account, returns access + refresh tokens
//! - POST `/login` - Verify credentials, returns access + refresh tokens
//! - POST `/refresh` - Exchange a refresh token for a new access token
//! - POST `/logout` - Revoke the presented access token
//! - GET `/me` - Current principal

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::error::{ApiError, ResultExt, map_unique_violation};
use crate::auth::{Auth, ClientIp};
use crate::db::{Database, PublicUser, UserRole};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::rate_limit::{
    LOGIN_LIMIT, LOGIN_WINDOW, REGISTER_LIMIT, REGISTER_WINDOW, RateLimitStore,
};
use crate::revocation::RevocationStore;

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub revocations: Arc<dyn RevocationStore>,
    pub rate_limiter: Arc<dyn RateLimitStore>,
}

impl_has_auth_backend!(AuthState);

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    name: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct SessionResponse {
    user: PublicUser,
    token: String,
    refresh_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
    expires_in: u64,
}

/// Unknown email and wrong password must be indistinguishable.
const BAD_CREDENTIALS: &str = "Email or password is incorrect";

async fn register(
    State(state): State<AuthState>,
    ClientIp(ip): ClientIp,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.rate_limiter.allow(&ip, REGISTER_LIMIT, REGISTER_WINDOW) {
        return Err(ApiError::too_many_requests("Too many registration attempts"));
    }

    let email = payload.email.trim();
    let name = payload.name.trim();

    validate_email(email)?;
    validate_register_password(&payload.password)?;
    validate_name(name)?;

    // The unique index on email still catches races past this check.
    if state
        .db
        .users()
        .get_by_email(email)
        .await
        .db_err("Failed to check email availability")?
        .is_some()
    {
        return Err(ApiError::conflict("Email is already in use"));
    }

    let password_hash = hash_password_blocking(payload.password).await.map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::internal("Failed to create user")
    })?;

    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .users()
        .create(&uuid, email, name, &password_hash, UserRole::User)
        .await
        .map_err(|e| map_unique_violation(e, "Email is already in use", "Failed to create user"))?;

    let user = state
        .db
        .users()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load created user")?
        .ok_or_else(|| ApiError::internal("Failed to load created user"))?;

    let session = issue_session(&state.jwt, &user.uuid, &user.email, &user.name, user.role)?;

    Ok((
        StatusCode::CREATED,
        Json(super::envelope::success_with_message(
            SessionResponse {
                user: user.public(),
                ..session
            },
            "Registration successful",
        )),
    ))
}

async fn login(
    State(state): State<AuthState>,
    ClientIp(ip): ClientIp,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.rate_limiter.allow(&ip, LOGIN_LIMIT, LOGIN_WINDOW) {
        return Err(ApiError::too_many_requests("Too many login attempts"));
    }

    let email = payload.email.trim();

    validate_email(email)?;
    if payload.password.len() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    let user = state
        .db
        .users()
        .get_by_email(email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    if !verify_password_blocking(payload.password, user.password_hash.clone()).await {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let session = issue_session(&state.jwt, &user.uuid, &user.email, &user.name, user.role)?;

    Ok((
        StatusCode::OK,
        Json(super::envelope::success_with_message(
            SessionResponse {
                user: user.public(),
                ..session
            },
            "Login successful",
        )),
    ))
}

/// Exchange a refresh token for a new access token. Access tokens presented
/// here are rejected by the token-type check.
async fn refresh(
    State(state): State<AuthState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = state
        .jwt
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let user = state
        .db
        .users()
        .get_by_uuid(&claims.sub)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let access = state
        .jwt
        .generate_access_token(&user.uuid, &user.email, &user.name, user.role)
        .map_err(|e| {
            error!(error = %e, "Failed to generate access token");
            ApiError::internal("Failed to generate token")
        })?;

    Ok((
        StatusCode::OK,
        Json(super::envelope::success(RefreshResponse {
            token: access.token,
            expires_in: access.expires_in,
        })),
    ))
}

/// Logout - revoke the presented access token for the rest of the process
/// lifetime.
async fn logout(
    State(state): State<AuthState>,
    Auth(user): Auth,
) -> Result<impl IntoResponse, ApiError> {
    state.revocations.revoke(&user.token);

    Ok((
        StatusCode::OK,
        Json(super::envelope::success_with_message(
            serde_json::json!(null),
            "Logged out",
        )),
    ))
}

async fn me(Auth(user): Auth) -> impl IntoResponse {
    let claims = user.claims;
    Json(super::envelope::success(PublicUser {
        id: claims.sub,
        email: claims.email,
        name: claims.name,
        role: claims.role,
    }))
}

fn issue_session(
    jwt: &JwtConfig,
    uuid: &str,
    email: &str,
    name: &str,
    role: UserRole,
) -> Result<SessionResponse, ApiError> {
    let access = jwt.generate_access_token(uuid, email, name, role).map_err(|e| {
        error!(error = %e, "Failed to generate access token");
        ApiError::internal("Failed to generate token")
    })?;
    let refresh = jwt.generate_refresh_token(uuid).map_err(|e| {
        error!(error = %e, "Failed to generate refresh token");
        ApiError::internal("Failed to generate token")
    })?;

    Ok(SessionResponse {
        user: PublicUser {
            id: uuid.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role,
        },
        token: access.token,
        refresh_token: refresh.token,
        expires_in: access.expires_in,
    })
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.len() <= 255
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            });
    if !valid {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    Ok(())
}

fn validate_register_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(ApiError::bad_request(
            "Password must contain upper and lower case letters and a digit",
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.len() < 2 {
        return Err(ApiError::bad_request("Name must be at least 2 characters"));
    }
    if name.len() > 100 {
        return Err(ApiError::bad_request("Name is too long"));
    }
    Ok(())
}
