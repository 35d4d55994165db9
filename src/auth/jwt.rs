/// Access token codec
///
/// Issues and verifies HS256-signed JWTs. The verifier pins the algorithm;
/// the `alg` field in a presented header is never used to choose how to check
/// it. Expiry is checked here rather than by `jsonwebtoken` so that a token
/// whose `exp` equals the current second is rejected.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};

/// Why an access token could not be issued or accepted
#[derive(Debug, Clone, PartialEq)]
pub enum TokenError {
    Expired,
    Signature,
    Malformed,
    InvalidTtl,
    Encoding(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::Signature => write!(f, "token signature does not verify"),
            TokenError::Malformed => write!(f, "token is malformed"),
            TokenError::InvalidTtl => write!(f, "token lifetime must be at least one second"),
            TokenError::Encoding(msg) => write!(f, "token encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issue an access token for `subject` valid for `ttl` from now
///
/// # Errors
/// `TokenError::InvalidTtl` for a `ttl` shorter than one second or one that
/// overflows the clock
pub fn issue_access_token(subject: Uuid, secret: &str, ttl: Duration) -> Result<String, TokenError> {
    issue_access_token_at(subject, secret, ttl, Utc::now())
}

/// Issue an access token as if the current time were `now`
pub fn issue_access_token_at(
    subject: Uuid,
    secret: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    // claims carry whole seconds; anything shorter can expire before it is used
    if ttl < Duration::seconds(1) {
        return Err(TokenError::InvalidTtl);
    }

    let claims = Claims::new(subject, now, ttl)?;
    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Encoding(e.to_string()))
}

/// Verify an access token and return its subject
///
/// # Errors
/// - `Signature` if the MAC does not match or the header names another algorithm
/// - `Malformed` if the token or its claims cannot be parsed
/// - `Expired` if `exp <= now`
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    verify_access_token_at(token, secret, Utc::now())
}

/// Verify an access token against the given clock reading
pub fn verify_access_token_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation error: {}", e);
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::Signature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    })?;

    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }

    claims.subject()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    #[test]
    fn test_issue_and_verify_token() {
        let user_id = Uuid::new_v4();

        let token = issue_access_token(user_id, SECRET, Duration::hours(1))
            .expect("Failed to issue token");
        let subject = verify_access_token(&token, SECRET).expect("Failed to verify token");

        assert_eq!(subject, user_id);
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let user_id = Uuid::new_v4();

        assert_eq!(
            issue_access_token(user_id, SECRET, Duration::zero()),
            Err(TokenError::InvalidTtl)
        );
        assert_eq!(
            issue_access_token(user_id, SECRET, Duration::hours(-1)),
            Err(TokenError::InvalidTtl)
        );
    }

    #[test]
    fn test_sub_second_ttl_is_rejected() {
        let user_id = Uuid::new_v4();

        assert_eq!(
            issue_access_token(user_id, SECRET, Duration::milliseconds(900)),
            Err(TokenError::InvalidTtl)
        );
        assert_eq!(
            issue_access_token(user_id, SECRET, Duration::nanoseconds(1)),
            Err(TokenError::InvalidTtl)
        );
    }

    #[test]
    fn test_overflowing_ttl_is_rejected() {
        assert_eq!(
            issue_access_token(Uuid::new_v4(), SECRET, Duration::MAX),
            Err(TokenError::InvalidTtl)
        );
    }

    #[test]
    fn test_short_ttl_verifies_immediately() {
        for ttl in [Duration::seconds(1), Duration::milliseconds(1500), Duration::seconds(2)] {
            for _ in 0..20 {
                let user_id = Uuid::new_v4();
                let token = issue_access_token(user_id, SECRET, ttl).expect("Failed to issue token");

                assert_eq!(verify_access_token(&token, SECRET), Ok(user_id), "ttl {:?}", ttl);
            }
        }
    }

    #[test]
    fn test_one_second_ttl_late_in_the_second() {
        let issued_at = DateTime::from_timestamp(1_700_000_000, 999_000_000).unwrap();
        let user_id = Uuid::new_v4();
        let token = issue_access_token_at(user_id, SECRET, Duration::seconds(1), issued_at)
            .expect("Failed to issue token");

        assert_eq!(verify_access_token_at(&token, SECRET, issued_at), Ok(user_id));
        assert_eq!(
            verify_access_token_at(&token, SECRET, issued_at + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now();
        let token = issue_access_token_at(Uuid::new_v4(), SECRET, Duration::hours(1), now - Duration::hours(2))
            .expect("Failed to issue token");

        assert_eq!(verify_access_token_at(&token, SECRET, now), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_expiring_now_is_expired() {
        let issued_at = Utc::now();
        let ttl = Duration::minutes(5);
        let token = issue_access_token_at(Uuid::new_v4(), SECRET, ttl, issued_at)
            .expect("Failed to issue token");

        assert!(verify_access_token_at(&token, SECRET, issued_at + ttl - Duration::seconds(1)).is_ok());
        assert_eq!(
            verify_access_token_at(&token, SECRET, issued_at + ttl),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_access_token(Uuid::new_v4(), "secret-a", Duration::hours(1))
            .expect("Failed to issue token");

        assert_eq!(verify_access_token(&token, "secret-b"), Err(TokenError::Signature));
    }

    #[test]
    fn test_swapped_claims_fail_signature() {
        let victim = issue_access_token(Uuid::new_v4(), SECRET, Duration::hours(1))
            .expect("Failed to issue token");
        let forged = issue_access_token(Uuid::new_v4(), "attacker-secret", Duration::hours(1))
            .expect("Failed to issue token");

        let victim_parts: Vec<&str> = victim.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", victim_parts[0], forged_parts[1], victim_parts[2]);

        assert_eq!(verify_access_token(&tampered, SECRET), Err(TokenError::Signature));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1)).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token");

        assert_eq!(verify_access_token(&token, SECRET), Err(TokenError::Signature));
    }

    #[test]
    fn test_malformed_token() {
        assert_eq!(verify_access_token("invalid.jwt.token", SECRET), Err(TokenError::Malformed));
        assert_eq!(verify_access_token("", SECRET), Err(TokenError::Malformed));
    }

    #[test]
    fn test_wrong_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1)).unwrap();
        claims.iss = "someone-else".to_string();
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token");

        assert_eq!(verify_access_token(&token, SECRET), Err(TokenError::Malformed));
    }
}
