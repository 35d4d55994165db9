use actix_web::{http::header::ContentType, web, HttpResponse};
use std::sync::atomic::Ordering;

use crate::error::{AppError, AuthError};
use crate::state::AppState;

/// GET /admin/metrics
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    let hits = state.file_server_hits.load(Ordering::Relaxed);
    HttpResponse::Ok().content_type(ContentType::html()).body(format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        hits
    ))
}

/// POST /admin/reset
///
/// Zeroes the hit counter and empties the store. Only permitted on the `dev`
/// platform.
pub async fn reset(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if !state.allows_reset {
        return Err(AuthError::Forbidden.into());
    }

    state.file_server_hits.store(0, Ordering::Relaxed);
    state.refresh_tokens.delete_all_for_reset().await?;
    state.users.delete_all_users().await?;

    tracing::warn!("Store reset");
    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hits reset"))
}
