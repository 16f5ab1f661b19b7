//! JWT token generation and validation.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::UserRole;

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Access token carrying the full identity (default 7 days)
    Access,
    /// Refresh token with a narrow claim set - must be exchanged, never used directly
    Refresh,
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user UUID)
    pub sub: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// User role
    pub role: UserRole,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// JWT claims for refresh tokens. Deliberately narrow: no role, name, or
/// email, so a refresh token can never pass an authorization check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user UUID)
    pub sub: String,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Claims read without signature verification. Only `exp` is trusted enough
/// to answer "has this token's expiry passed" - never authorization.
#[derive(Debug, Clone, Deserialize)]
pub struct UncheckedClaims {
    pub exp: u64,
}

/// Default access token duration: 7 days
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default refresh token duration: 30 days
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

/// Result of generating a token.
#[derive(Debug, Clone)]
pub struct TokenResult {
    /// The JWT token string
    pub token: String,
    /// Token duration in seconds
    pub expires_in: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and default TTLs.
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttls(secret, DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS)
    }

    /// Create a new JWT configuration with explicit token lifetimes.
    pub fn with_ttls(secret: &[u8], access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Generate an access token embedding the user's identity and role.
    pub fn generate_access_token(
        &self,
        user_uuid: &str,
        email: &str,
        name: &str,
        role: UserRole,
    ) -> Result<TokenResult, JwtError> {
        let now = unix_now()?;

        let claims = AccessClaims {
            sub: user_uuid.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            token_type: TokenType::Access,
            iat: now,
            exp: now + self.access_ttl_secs,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(TokenResult {
            token,
            expires_in: self.access_ttl_secs,
        })
    }

    /// Generate a refresh token for a user. Carries only the user UUID.
    pub fn generate_refresh_token(&self, user_uuid: &str) -> Result<TokenResult, JwtError> {
        let now = unix_now()?;

        let claims = RefreshClaims {
            sub: user_uuid.to_string(),
            token_type: TokenType::Refresh,
            iat: now,
            exp: now + self.refresh_ttl_secs,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(TokenResult {
            token,
            expires_in: self.refresh_ttl_secs,
        })
    }

    /// Validate and decode an access token. Fails closed: bad signature,
    /// expiry, or a refresh token presented here all return an error.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
                .map_err(JwtError::Decoding)?;

        if token_data.claims.token_type != TokenType::Access {
            return Err(JwtError::WrongTokenType);
        }

        Ok(token_data.claims)
    }

    /// Validate and decode a refresh token. Access tokens are rejected.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<RefreshClaims>(token, &self.decoding_key, &validation)
                .map_err(JwtError::Decoding)?;

        if token_data.claims.token_type != TokenType::Refresh {
            return Err(JwtError::WrongTokenType);
        }

        Ok(token_data.claims)
    }

    /// Read a token's claims WITHOUT verifying the signature or expiry.
    /// Only suitable for expiry introspection; never for authorization.
    pub fn decode_unchecked(token: &str) -> Option<UncheckedClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;

        jsonwebtoken::decode::<UncheckedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .ok()
    }

    /// Whether a token's expiry timestamp has passed. Undecodable tokens
    /// count as expired.
    pub fn is_expired(token: &str) -> bool {
        match (Self::decode_unchecked(token), unix_now()) {
            (Some(claims), Ok(now)) => now >= claims.exp,
            _ => true,
        }
    }
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
    /// Wrong token type (e.g., using refresh token as access token)
    WrongTokenType,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::WrongTokenType => write!(f, "Wrong token type"),
        }
    }
}

impl std::error::Error for JwtError {}
