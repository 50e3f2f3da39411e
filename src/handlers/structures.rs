use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Structure;
use crate::hierarchy::Forest;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::structure_service::{self, CreateStructure, UpdateStructure};

/// GET /api/structures
pub async fn list() -> ApiResult<Vec<Structure>> {
    Ok(ApiResponse::success(structure_service::list().await?))
}

/// GET /api/structures/tree
pub async fn tree() -> ApiResult<Forest<Structure>> {
    Ok(ApiResponse::success(structure_service::tree().await?))
}

/// GET /api/structures/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Structure> {
    Ok(ApiResponse::success(structure_service::get(id).await?))
}

/// POST /api/structures
pub async fn create(Json(payload): Json<CreateStructure>) -> ApiResult<Structure> {
    Ok(ApiResponse::created(structure_service::create(payload).await?))
}

/// PUT /api/structures/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStructure>,
) -> ApiResult<Structure> {
    Ok(ApiResponse::success(
        structure_service::update(id, payload).await?,
    ))
}

/// DELETE /api/structures/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    structure_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
