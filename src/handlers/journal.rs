use axum::extract::Query;
use serde::Deserialize;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::journal_service::{self, JournalPage};

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    pub limit: Option<i64>,
}

/// GET /api/journal - audit trail, most recent first
pub async fn list(Query(query): Query<JournalQuery>) -> ApiResult<JournalPage> {
    let page = journal_service::list(query.limit.unwrap_or(100)).await?;
    Ok(ApiResponse::success(page))
}
