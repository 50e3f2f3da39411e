use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{Group, User};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::group_service::{self, CreateGroup, SetPermissions, UpdateGroup};

/// GET /api/groups
pub async fn list() -> ApiResult<Vec<Group>> {
    Ok(ApiResponse::success(group_service::list().await?))
}

/// GET /api/groups/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Group> {
    Ok(ApiResponse::success(group_service::get(id).await?))
}

/// POST /api/groups
pub async fn create(Json(payload): Json<CreateGroup>) -> ApiResult<Group> {
    Ok(ApiResponse::created(group_service::create(payload).await?))
}

/// PUT /api/groups/:id
pub async fn update(Path(id): Path<Uuid>, Json(payload): Json<UpdateGroup>) -> ApiResult<Group> {
    Ok(ApiResponse::success(group_service::update(id, payload).await?))
}

/// PUT /api/groups/:id/permissions
pub async fn set_permissions(
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPermissions>,
) -> ApiResult<Group> {
    Ok(ApiResponse::success(
        group_service::set_permissions(id, payload).await?,
    ))
}

/// DELETE /api/groups/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    group_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// GET /api/groups/:id/members
pub async fn members(Path(id): Path<Uuid>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(group_service::members(id).await?))
}

/// POST /api/groups/:id/members/:user_id
pub async fn add_member(Path((id, user_id)): Path<(Uuid, Uuid)>) -> ApiResult<Value> {
    group_service::add_member(id, user_id).await?;
    Ok(ApiResponse::created(json!({ "added": true })))
}

/// DELETE /api/groups/:id/members/:user_id
pub async fn remove_member(Path((id, user_id)): Path<(Uuid, Uuid)>) -> ApiResult<Value> {
    group_service::remove_member(id, user_id).await?;
    Ok(ApiResponse::success(json!({ "removed": true })))
}
