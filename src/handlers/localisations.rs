use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Localisation;
use crate::hierarchy::Forest;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::localisation_service::{self, CreateLocalisation, UpdateLocalisation};

/// GET /api/localisations
pub async fn list() -> ApiResult<Vec<Localisation>> {
    Ok(ApiResponse::success(localisation_service::list().await?))
}

/// GET /api/localisations/tree
pub async fn tree() -> ApiResult<Forest<Localisation>> {
    Ok(ApiResponse::success(localisation_service::tree().await?))
}

/// GET /api/localisations/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Localisation> {
    Ok(ApiResponse::success(localisation_service::get(id).await?))
}

/// POST /api/localisations
pub async fn create(Json(payload): Json<CreateLocalisation>) -> ApiResult<Localisation> {
    Ok(ApiResponse::created(
        localisation_service::create(payload).await?,
    ))
}

/// PUT /api/localisations/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocalisation>,
) -> ApiResult<Localisation> {
    Ok(ApiResponse::success(
        localisation_service::update(id, payload).await?,
    ))
}

/// DELETE /api/localisations/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    localisation_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
