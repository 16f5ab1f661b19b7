//! Password hashing via bcrypt.
//!
//! The salt is generated per hash and embedded in the digest; nothing is
//! stored separately. Hashing is CPU-bound and the async wrappers run it on
//! the blocking thread pool.

use tracing::error;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 12;

/// Hash a password with bcrypt (cost 12).
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Verify a password against a bcrypt digest. A mismatch is `false`, never
/// an error; an unparsable digest is also treated as a mismatch.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match bcrypt::verify(password, digest) {
        Ok(matches) => matches,
        Err(e) => {
            error!(error = %e, "Failed to verify password digest");
            false
        }
    }
}

/// Async wrapper around [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, bcrypt::BcryptError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .unwrap_or_else(|e| Err(bcrypt::BcryptError::Io(std::io::Error::other(e))))
}

/// Async wrapper around [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, digest: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext() {
        let digest = hash_password("secret").unwrap();
        assert_ne!(digest, "secret");
        assert!(digest.starts_with("$2"));
    }

    #[test]
    fn test_verify_roundtrip() {
        let digest = hash_password("secret").unwrap();
        assert!(verify_password("secret", &digest));
        assert!(!verify_password("wrong", &digest));
    }

    #[test]
    fn test_unique_salts() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b, "Each digest should embed a fresh salt");
    }

    #[test]
    fn test_garbage_digest_is_mismatch() {
        assert!(!verify_password("secret", "not-a-bcrypt-digest"));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let digest = hash_password_blocking("secret".to_string()).await.unwrap();
        assert!(verify_password_blocking("secret".to_string(), digest.clone()).await);
        assert!(!verify_password_blocking("wrong".to_string(), digest).await);
    }
}
