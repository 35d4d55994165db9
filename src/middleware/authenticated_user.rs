/// Access-token authentication for protected handlers
///
/// Taking `AuthenticatedUser` as a handler argument runs
/// `SessionManager::authorize` on the request's `Authorization` header before
/// the handler body executes.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Identity proven by a valid access token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.sessions.authorize(req.headers()).map(|user_id| {
                tracing::debug!(user_id = %user_id, "Access token validated");
                AuthenticatedUser(user_id)
            }),
            None => Err(AppError::Internal("application state not registered".to_string())),
        };
        ready(result)
    }
}
