use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Serie;
use crate::hierarchy::Forest;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::serie_service::{self, CreateSerie, UpdateSerie};

/// GET /api/series - flat list, ordered by level then name
pub async fn list() -> ApiResult<Vec<Serie>> {
    Ok(ApiResponse::success(serie_service::list().await?))
}

/// GET /api/series/tree - full filing plan as a forest
pub async fn tree() -> ApiResult<Forest<Serie>> {
    Ok(ApiResponse::success(serie_service::tree().await?))
}

/// GET /api/series/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Serie> {
    Ok(ApiResponse::success(serie_service::get(id).await?))
}

/// POST /api/series
pub async fn create(Json(payload): Json<CreateSerie>) -> ApiResult<Serie> {
    Ok(ApiResponse::created(serie_service::create(payload).await?))
}

/// PUT /api/series/:id
pub async fn update(Path(id): Path<Uuid>, Json(payload): Json<UpdateSerie>) -> ApiResult<Serie> {
    Ok(ApiResponse::success(serie_service::update(id, payload).await?))
}

/// DELETE /api/series/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    serie_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
