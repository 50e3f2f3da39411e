use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Beneficiaire;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::beneficiaire_service::{self, CreateBeneficiaire, UpdateBeneficiaire};

/// GET /api/beneficiaires
pub async fn list() -> ApiResult<Vec<Beneficiaire>> {
    Ok(ApiResponse::success(beneficiaire_service::list().await?))
}

/// GET /api/beneficiaires/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Beneficiaire> {
    Ok(ApiResponse::success(beneficiaire_service::get(id).await?))
}

/// POST /api/beneficiaires
pub async fn create(Json(payload): Json<CreateBeneficiaire>) -> ApiResult<Beneficiaire> {
    Ok(ApiResponse::created(
        beneficiaire_service::create(payload).await?,
    ))
}

/// PUT /api/beneficiaires/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBeneficiaire>,
) -> ApiResult<Beneficiaire> {
    Ok(ApiResponse::success(
        beneficiaire_service::update(id, payload).await?,
    ))
}

/// DELETE /api/beneficiaires/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    beneficiaire_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
