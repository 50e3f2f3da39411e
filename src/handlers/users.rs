use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{Group, User};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::user_service::{self, CreateUser, UpdateUser};

/// GET /api/users
pub async fn list() -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(user_service::list().await?))
}

/// GET /api/users/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<User> {
    Ok(ApiResponse::success(user_service::get(id).await?))
}

/// POST /api/users
pub async fn create(Json(payload): Json<CreateUser>) -> ApiResult<User> {
    Ok(ApiResponse::created(user_service::create(payload).await?))
}

/// PUT /api/users/:id
pub async fn update(Path(id): Path<Uuid>, Json(payload): Json<UpdateUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user_service::update(id, payload).await?))
}

/// PATCH /api/users/:id/toggle
pub async fn toggle(Path(id): Path<Uuid>) -> ApiResult<User> {
    Ok(ApiResponse::success(user_service::toggle_active(id).await?))
}

/// DELETE /api/users/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    user_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// GET /api/users/:id/groups
pub async fn groups(Path(id): Path<Uuid>) -> ApiResult<Vec<Group>> {
    Ok(ApiResponse::success(user_service::groups_of(id).await?))
}
