use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Liasse;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::liasse_service::{self, CreateLiasse, UpdateLiasse};

/// GET /api/liasses
pub async fn list() -> ApiResult<Vec<Liasse>> {
    Ok(ApiResponse::success(liasse_service::list().await?))
}

/// GET /api/liasses/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Liasse> {
    Ok(ApiResponse::success(liasse_service::get(id).await?))
}

/// POST /api/liasses
pub async fn create(Json(payload): Json<CreateLiasse>) -> ApiResult<Liasse> {
    Ok(ApiResponse::created(liasse_service::create(payload).await?))
}

/// PUT /api/liasses/:id
pub async fn update(Path(id): Path<Uuid>, Json(payload): Json<UpdateLiasse>) -> ApiResult<Liasse> {
    Ok(ApiResponse::success(liasse_service::update(id, payload).await?))
}

/// DELETE /api/liasses/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    liasse_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
