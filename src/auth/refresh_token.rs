/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 random bytes from the OS-seeded thread RNG, hex encoded (64 chars)
/// - Stored by SHA-256 fingerprint, never in plaintext
/// - Valid until `expires_at` or until revoked, whichever comes first
/// - Not rotated when used to mint a new access token

use chrono::{DateTime, Utc};
use rand::{thread_rng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const REFRESH_TOKEN_BYTES: usize = 32;

/// A persisted refresh token
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Lifecycle position of a refresh token. Both non-active states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

impl RefreshToken {
    /// Revocation wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Generate a new refresh token
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 fingerprint a token is stored and looked up by
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_in: Duration, revoked: bool) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            token: generate_refresh_token(),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            expires_at: now + expires_in,
            revoked_at: if revoked { Some(now) } else { None },
        }
    }

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_refresh_token(), generate_refresh_token());
    }

    #[test]
    fn test_fingerprint() {
        let token = generate_refresh_token();

        assert_eq!(fingerprint(&token), fingerprint(&token));
        assert_ne!(fingerprint(&token), token);
        assert_eq!(fingerprint(&token).len(), 64);
    }

    #[test]
    fn test_states() {
        let now = Utc::now();

        assert_eq!(record(Duration::days(60), false).state_at(now), RefreshTokenState::Active);
        assert_eq!(record(Duration::days(-1), false).state_at(now), RefreshTokenState::Expired);
        assert_eq!(record(Duration::days(60), true).state_at(now), RefreshTokenState::Revoked);
        assert_eq!(record(Duration::days(-1), true).state_at(now), RefreshTokenState::Revoked);
    }

    #[test]
    fn test_expiry_boundary() {
        let token = record(Duration::days(1), false);
        assert_eq!(token.state_at(token.expires_at), RefreshTokenState::Expired);
    }
}
