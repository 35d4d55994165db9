use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AuthError, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use crate::store::SortOrder;
use crate::validators::clean_chirp_body;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ChirpQuery {
    pub author_id: Option<Uuid>,
    pub sort: Option<String>,
}

fn sort_order(sort: Option<&str>) -> Result<SortOrder, ValidationError> {
    match sort {
        None | Some("asc") => Ok(SortOrder::Ascending),
        Some("desc") => Ok(SortOrder::Descending),
        Some(_) => Err(ValidationError::InvalidFormat("sort".to_string())),
    }
}

/// POST /api/chirps
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<ChirpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = clean_chirp_body(&form.body)?;
    let chirp = state.chirps.create_chirp(user.id(), &body).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %user.id(), "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ChirpQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let order = sort_order(query.sort.as_deref())?;
    let chirps = state.chirps.list_chirps(query.author_id, order).await?;
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chirp = state.chirps.get_chirp(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 403: The chirp belongs to someone else
/// - 404: No such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chirp = state.chirps.get_chirp(path.into_inner()).await?;
    if chirp.user_id != user.id() {
        tracing::warn!(chirp_id = %chirp.id, user_id = %user.id(), "Delete by non-author refused");
        return Err(AuthError::Forbidden.into());
    }

    state.chirps.delete_chirp(chirp.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
