use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::auth::SessionManager;
use crate::configuration::Settings;
use crate::store::{ChirpStore, RefreshTokenStore, UserStore};

/// Everything request handlers share. Built once at startup.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub chirps: Arc<dyn ChirpStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub sessions: SessionManager,
    /// Requests served under `/app/`
    pub file_server_hits: Arc<AtomicU64>,
    pub allows_reset: bool,
    pub polka_key: String,
}

impl AppState {
    pub fn new<S>(settings: &Settings, store: Arc<S>) -> Self
    where
        S: UserStore + ChirpStore + RefreshTokenStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let chirps: Arc<dyn ChirpStore> = store.clone();
        let refresh_tokens: Arc<dyn RefreshTokenStore> = store;

        Self {
            sessions: SessionManager::new(
                settings.auth.secret.clone(),
                users.clone(),
                refresh_tokens.clone(),
            ),
            users,
            chirps,
            refresh_tokens,
            file_server_hits: Arc::new(AtomicU64::new(0)),
            allows_reset: settings.application.allows_reset(),
            polka_key: settings.auth.polka_key.clone(),
        }
    }
}
