//! Revoked-token tracking for logout.
//!
//! Revocations live for the process lifetime only; a restart clears the set.
//! Tokens whose expiry has already passed are pruned opportunistically on
//! each revoke (an expired token fails signature validation anyway), but
//! unexpired revocations are never evicted - the set grows until the process
//! restarts. Both are accepted limitations of the in-memory store.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::jwt::JwtConfig;

/// Store for explicitly invalidated tokens.
///
/// Implementations must support concurrent revoke/check from request
/// handlers without lost updates.
pub trait RevocationStore: Send + Sync {
    /// Mark a token as revoked. Idempotent.
    fn revoke(&self, token: &str);

    /// Whether a token has been revoked.
    fn is_revoked(&self, token: &str) -> bool;
}

/// In-memory [`RevocationStore`] backed by a lock-guarded set.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    revoked: RwLock<HashSet<String>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked revocations (expired entries included until the
    /// next prune).
    pub fn len(&self) -> usize {
        self.revoked.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.read().unwrap().is_empty()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, token: &str) {
        let mut revoked = self.revoked.write().unwrap();
        // Lazy prune: entries past their (unverified) exp can never validate
        // again, so they no longer need tracking.
        revoked.retain(|t| !JwtConfig::is_expired(t));
        revoked.insert(token.to_string());
    }

    fn is_revoked(&self, token: &str) -> bool {
        self.revoked.read().unwrap().contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::UserRole;

    fn token() -> String {
        JwtConfig::new(b"test-secret")
            .generate_access_token("uuid-1", "alice@example.com", "Alice", UserRole::User)
            .unwrap()
            .token
    }

    #[test]
    fn test_revoke_and_check() {
        let store = InMemoryRevocationStore::new();
        let t = token();

        assert!(!store.is_revoked(&t));
        store.revoke(&t);
        assert!(store.is_revoked(&t));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let store = InMemoryRevocationStore::new();
        let t = token();

        store.revoke(&t);
        store.revoke(&t);
        assert!(store.is_revoked(&t));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unrelated_token_not_revoked() {
        let store = InMemoryRevocationStore::new();
        store.revoke(&token());
        assert!(!store.is_revoked(&token()));
    }

    #[test]
    fn test_expired_entries_pruned_on_revoke() {
        let store = InMemoryRevocationStore::new();

        // An opaque non-JWT string decodes to nothing and counts as expired,
        // so the next revoke sweeps it out.
        store.revoke("opaque-garbage");
        assert_eq!(store.len(), 1);

        let live = token();
        store.revoke(&live);
        assert_eq!(store.len(), 1);
        assert!(store.is_revoked(&live));
        assert!(!store.is_revoked("opaque-garbage"));
    }
}
