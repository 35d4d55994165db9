use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract_api_key;
use crate::error::{AppError, AuthError, ValidationError};
use crate::state::AppState;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    pub data: WebhookData,
}

/// POST /api/polka/webhooks
///
/// Requires `Authorization: ApiKey <key>`. The key is checked before the body
/// is parsed. Events other than `user.upgraded` are acknowledged and ignored.
///
/// # Errors
/// - 400: Missing or malformed Authorization header, or a malformed body
/// - 401: Wrong API key, whatever the body
/// - 404: Unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let key = extract_api_key(req.headers())?;
    if key != state.polka_key {
        return Err(AuthError::WrongApiKey.into());
    }

    let payload: PolkaWebhook = serde_json::from_slice(&body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    state.users.upgrade_to_chirpy_red(payload.data.user_id).await?;
    tracing::info!(user_id = %payload.data.user_id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}
