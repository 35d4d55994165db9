/// Record stores
///
/// The service talks to persistence only through these traits. `PgStore` is
/// the production backend; `InMemoryStore` backs tests and local runs. Both
/// must make a record readable immediately after it is created.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::RefreshToken;
use crate::error::DatabaseError;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DatabaseError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError>;

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, DatabaseError>;

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<(), DatabaseError>;

    /// Removes every user together with their chirps and refresh tokens.
    async fn delete_all_users(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError>;

    /// Chirps ordered by creation time, optionally restricted to one author.
    async fn list_chirps(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<Chirp>, DatabaseError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError>;

    async fn delete_chirp(&self, id: Uuid) -> Result<(), DatabaseError>;
}

/// Persisted refresh tokens
///
/// `revoked_at` moves from unset to set at most once; revoking an already
/// revoked token succeeds and keeps the first timestamp.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Fails with `UniqueConstraintViolation` only on a token collision.
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, DatabaseError>;

    async fn find_by_token(&self, token: &str) -> Result<RefreshToken, DatabaseError>;

    async fn revoke(&self, token: &str) -> Result<(), DatabaseError>;

    async fn delete_all_for_reset(&self) -> Result<(), DatabaseError>;
}
