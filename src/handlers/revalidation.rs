use std::collections::HashMap;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::revalidate;

/// GET /api/revalidation - current version per view path. Clients compare
/// against the versions they rendered with and refetch the stale ones.
pub async fn versions() -> ApiResult<HashMap<String, u64>> {
    Ok(ApiResponse::success(revalidate::versions().await))
}
