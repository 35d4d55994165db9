/// Session management
///
/// Login, refresh, revoke and authorize. The signing secret is handed over
/// once at construction and never changes afterwards.
///
/// Refresh tokens are not rotated on use: a refresh token keeps minting
/// access tokens until it expires or is revoked. Rotating it (issue a new one,
/// revoke the old) would shrink the window for a stolen token.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::credentials::extract_bearer;
use crate::auth::jwt::{issue_access_token, verify_access_token};
use crate::auth::password::{reject_unknown_account, verify_password};
use crate::auth::refresh_token::{generate_refresh_token, RefreshTokenState};
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{RefreshTokenStore, User, UserStore};

pub fn access_token_ttl() -> Duration {
    Duration::hours(1)
}

pub fn refresh_token_ttl() -> Duration {
    Duration::days(60)
}

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionManager {
    secret: String,
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl SessionManager {
    pub fn new(
        secret: String,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            secret,
            users,
            refresh_tokens,
        }
    }

    /// Verify email and password, then issue an access and a refresh token
    ///
    /// # Errors
    /// `AuthError::InvalidCredentials` for an unknown email and for a wrong
    /// password alike
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = match self.users.get_user_by_email(email).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => return Err(reject_unknown_account(password).into()),
            Err(e) => return Err(e.into()),
        };

        verify_password(password, &user.hashed_password)?;

        let access_token = issue_access_token(user.id, &self.secret, access_token_ttl())?;
        let refresh_token = generate_refresh_token();
        self.refresh_tokens
            .create(user.id, &refresh_token, Utc::now() + refresh_token_ttl())
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from the refresh token in `Authorization: Bearer`
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let presented = extract_bearer(headers)?;
        self.refresh_token(&presented).await
    }

    /// Mint a new access token from a presented refresh token
    ///
    /// # Errors
    /// - `InvalidToken` if no such token is stored
    /// - `TokenRevoked` if it was revoked, even before its expiry
    /// - `TokenExpired` if its expiry has passed
    pub async fn refresh_token(&self, presented: &str) -> Result<String, AppError> {
        let record = match self.refresh_tokens.find_by_token(presented).await {
            Ok(record) => record,
            Err(DatabaseError::NotFound(_)) => return Err(AuthError::InvalidToken.into()),
            Err(e) => return Err(e.into()),
        };

        match record.state_at(Utc::now()) {
            RefreshTokenState::Revoked => {
                tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
                Err(AuthError::TokenRevoked.into())
            }
            RefreshTokenState::Expired => {
                tracing::info!(user_id = %record.user_id, "Refresh token expired");
                Err(AuthError::TokenExpired.into())
            }
            RefreshTokenState::Active => {
                let token = issue_access_token(record.user_id, &self.secret, access_token_ttl())?;
                tracing::info!(user_id = %record.user_id, "Access token refreshed");
                Ok(token)
            }
        }
    }

    /// Revoke the refresh token in `Authorization: Bearer`
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let presented = extract_bearer(headers)?;
        self.revoke_token(&presented).await
    }

    /// Revoking an already revoked token succeeds.
    pub async fn revoke_token(&self, presented: &str) -> Result<(), AppError> {
        self.refresh_tokens.revoke(presented).await?;
        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Resolve the acting identity from `Authorization: Bearer <access token>`
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let presented = extract_bearer(headers)?;
        Ok(verify_access_token(&presented, &self.secret)?)
    }
}
