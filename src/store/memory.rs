use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Chirp, ChirpStore, RefreshTokenStore, SortOrder, User, UserStore};
use crate::auth::{fingerprint, RefreshToken};
use crate::error::DatabaseError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    // insertion order doubles as the tie-breaker for equal timestamps
    chirps: Vec<Chirp>,
    // keyed by fingerprint
    refresh_tokens: HashMap<String, RefreshToken>,
}

/// Process-local store behind a single lock, so cascades are atomic.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(tables: &Tables, email: &str, except: Option<Uuid>) -> bool {
    tables
        .users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if email_taken(&tables, email, None) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "users.email".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("User".to_string()))
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if email_taken(&tables, email, Some(id)) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "users.email".to_string(),
            ));
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("User".to_string()))?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("User".to_string()))?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_all_users(&self) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.users.clear();
        tables.chirps.clear();
        tables.refresh_tokens.clear();
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::NotFound("User".to_string()));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        tables.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<Chirp>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut chirps: Vec<Chirp> = tables
            .chirps
            .iter()
            .filter(|c| author_id.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect();

        chirps.sort_by_key(|c| c.created_at);
        if order == SortOrder::Descending {
            chirps.reverse();
        }
        Ok(chirps)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .chirps
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("Chirp".to_string()))
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.chirps.len();
        tables.chirps.retain(|c| c.id != id);
        if tables.chirps.len() == before {
            return Err(DatabaseError::NotFound("Chirp".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::NotFound("User".to_string()));
        }

        let key = fingerprint(token);
        if tables.refresh_tokens.contains_key(&key) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "refresh_tokens.token_hash".to_string(),
            ));
        }

        let now = Utc::now();
        let record = RefreshToken {
            token: token.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };
        tables.refresh_tokens.insert(key, record.clone());
        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> Result<RefreshToken, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .refresh_tokens
            .get(&fingerprint(token))
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("Refresh token".to_string()))
    }

    async fn revoke(&self, token: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let record = tables
            .refresh_tokens
            .get_mut(&fingerprint(token))
            .ok_or_else(|| DatabaseError::NotFound("Refresh token".to_string()))?;

        if record.revoked_at.is_none() {
            let now = Utc::now();
            record.revoked_at = Some(now);
            record.updated_at = now;
        }
        Ok(())
    }

    async fn delete_all_for_reset(&self) -> Result<(), DatabaseError> {
        self.tables.write().await.refresh_tokens.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_refresh_token;
    use chrono::Duration;

    async fn store_with_user() -> (InMemoryStore, User) {
        let store = InMemoryStore::new();
        let user = store
            .create_user("a@b.com", "digest")
            .await
            .expect("Failed to create user");
        (store, user)
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let (store, _) = store_with_user().await;

        let result = store.create_user("a@b.com", "other").await;
        assert!(matches!(result, Err(DatabaseError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn refresh_token_is_readable_after_create() {
        let (store, user) = store_with_user().await;
        let token = generate_refresh_token();
        let expires_at = Utc::now() + Duration::days(60);

        store.create(user.id, &token, expires_at).await.expect("Failed to create token");
        let found = store.find_by_token(&token).await.expect("Failed to find token");

        assert_eq!(found.user_id, user.id);
        assert_eq!(found.token, token);
        assert_eq!(found.expires_at, expires_at);
        assert!(found.revoked_at.is_none());
    }

    #[tokio::test]
    async fn token_collision_is_a_conflict() {
        let (store, user) = store_with_user().await;
        let expires_at = Utc::now() + Duration::days(60);

        store.create(user.id, "same", expires_at).await.expect("Failed to create token");
        let result = store.create(user.id, "same", expires_at).await;

        assert!(matches!(result, Err(DatabaseError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_keeps_first_timestamp() {
        let (store, user) = store_with_user().await;
        let token = generate_refresh_token();
        store
            .create(user.id, &token, Utc::now() + Duration::days(60))
            .await
            .expect("Failed to create token");

        store.revoke(&token).await.expect("First revoke failed");
        let first = store.find_by_token(&token).await.unwrap().revoked_at;
        store.revoke(&token).await.expect("Second revoke failed");
        let second = store.find_by_token(&token).await.unwrap().revoked_at;

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn revoke_unknown_token_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.revoke("missing").await;

        assert!(matches!(result, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn deleting_users_cascades() {
        let (store, user) = store_with_user().await;
        store.create_chirp(user.id, "hello").await.unwrap();
        store
            .create(user.id, "token", Utc::now() + Duration::days(1))
            .await
            .unwrap();

        store.delete_all_users().await.unwrap();

        assert!(store.list_chirps(None, SortOrder::Ascending).await.unwrap().is_empty());
        assert!(store.find_by_token("token").await.is_err());
        assert!(store.get_user_by_email("a@b.com").await.is_err());
    }

    #[tokio::test]
    async fn chirps_filter_and_sort() {
        let (store, alice) = store_with_user().await;
        let bob = store.create_user("bob@b.com", "digest").await.unwrap();

        let first = store.create_chirp(alice.id, "first").await.unwrap();
        store.create_chirp(bob.id, "from bob").await.unwrap();
        let last = store.create_chirp(alice.id, "last").await.unwrap();

        let asc = store.list_chirps(Some(alice.id), SortOrder::Ascending).await.unwrap();
        assert_eq!(asc, vec![first.clone(), last.clone()]);

        let desc = store.list_chirps(None, SortOrder::Descending).await.unwrap();
        assert_eq!(desc.len(), 3);
        assert_eq!(desc.first(), Some(&last));
        assert_eq!(desc.last(), Some(&first));
    }
}
