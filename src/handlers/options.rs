use axum::extract::Path;
use axum::Json;

use crate::database::models::Setting;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::options_service::{self, SetOption};

/// GET /api/options - all general settings
pub async fn list() -> ApiResult<Vec<Setting>> {
    Ok(ApiResponse::success(options_service::list().await?))
}

/// PUT /api/options/:cle - upsert one setting by key
pub async fn set(Path(cle): Path<String>, Json(payload): Json<SetOption>) -> ApiResult<Setting> {
    Ok(ApiResponse::success(options_service::set(&cle, payload).await?))
}
