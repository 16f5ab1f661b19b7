//! Authentication user types.

use crate::jwt::AccessClaims;

/// Authenticated principal extracted from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// JWT claims from the access token
    pub claims: AccessClaims,
    /// The raw token string, kept for revocation on logout
    pub token: String,
}
