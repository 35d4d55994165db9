/// Password Hashing and Verification
///
/// bcrypt with a fixed work factor. Verification collapses "wrong password"
/// and "unreadable digest" into the same outcome.

use bcrypt::{hash, verify};
use lazy_static::lazy_static;

use crate::error::AuthError;

pub const HASH_COST: u32 = 10;

lazy_static! {
    // Verified against when the account does not exist, so that path costs
    // the same as a real mismatch.
    static ref DUMMY_DIGEST: Option<String> = hash("chirpy-timing-equalizer", HASH_COST).ok();
}

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `AuthError::Hashing` if bcrypt fails (e.g. the salt source is unavailable)
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, HASH_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against its digest
///
/// # Errors
/// Returns `AuthError::InvalidCredentials` on mismatch or a corrupt digest
pub fn verify_password(password: &str, digest: &str) -> Result<(), AuthError> {
    match verify(password, digest) {
        Ok(true) => Ok(()),
        _ => Err(AuthError::InvalidCredentials),
    }
}

/// Burn one verification against a fixed digest and report a mismatch.
pub fn reject_unknown_account(password: &str) -> AuthError {
    if let Some(digest) = DUMMY_DIGEST.as_deref() {
        let _ = verify(password, digest);
    }
    AuthError::InvalidCredentials
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "pw1";
        let digest = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, digest);
        assert!(digest.starts_with("$2"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hash_password("pw1").expect("Failed to hash password");
        let second = hash_password("pw1").expect("Failed to hash password");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password() {
        let digest = hash_password("pw1").expect("Failed to hash password");

        assert!(verify_password("pw1", &digest).is_ok());
    }

    #[test]
    fn test_verify_wrong_password() {
        let digest = hash_password("pw1").expect("Failed to hash password");

        assert_eq!(verify_password("pw2", &digest), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn test_corrupt_digest_looks_like_mismatch() {
        assert_eq!(
            verify_password("pw1", "not-a-bcrypt-digest"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_unknown_account_rejection() {
        assert_eq!(reject_unknown_account("anything"), AuthError::InvalidCredentials);
    }
}
