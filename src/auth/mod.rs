//! JWT authentication with role-based access control.
//!
//! Bearer tokens from the `Authorization` header are validated against the
//! token service and the in-memory revocation set. Extractors distinguish
//! 401 (missing/invalid/expired/revoked token) from 403 (valid identity,
//! insufficient role).

mod errors;
mod extractors;
mod ip;
mod state;
mod types;

pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{
    AdminOnly, AnyRole, Auth, OptionalAuth, RoleConstraint, RoleGuard, Staff, authenticate,
    bearer_token,
};
pub use ip::{ClientIp, extract_client_ip};
pub use state::HasAuthBackend;
pub use types::AuthenticatedUser;
