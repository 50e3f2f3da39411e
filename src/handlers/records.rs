//! Handlers for the record-level tables: document types, documents and
//! dossiers (the dependents counted by the deletion guards).

use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{Document, Dossier, TypeDocument};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::document_service::{self, CreateDocument};
use crate::services::dossier_service::{self, CreateDossier};
use crate::services::type_document_service::{self, CreateTypeDocument, UpdateTypeDocument};

// --- Types de document ---

pub async fn type_document_list() -> ApiResult<Vec<TypeDocument>> {
    Ok(ApiResponse::success(type_document_service::list().await?))
}

pub async fn type_document_create(
    Json(payload): Json<CreateTypeDocument>,
) -> ApiResult<TypeDocument> {
    Ok(ApiResponse::created(
        type_document_service::create(payload).await?,
    ))
}

pub async fn type_document_update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTypeDocument>,
) -> ApiResult<TypeDocument> {
    Ok(ApiResponse::success(
        type_document_service::update(id, payload).await?,
    ))
}

pub async fn type_document_delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    type_document_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

// --- Documents ---

pub async fn document_list() -> ApiResult<Vec<Document>> {
    Ok(ApiResponse::success(document_service::list().await?))
}

pub async fn document_create(Json(payload): Json<CreateDocument>) -> ApiResult<Document> {
    Ok(ApiResponse::created(document_service::create(payload).await?))
}

pub async fn document_delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    document_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

// --- Dossiers ---

pub async fn dossier_list() -> ApiResult<Vec<Dossier>> {
    Ok(ApiResponse::success(dossier_service::list().await?))
}

pub async fn dossier_create(Json(payload): Json<CreateDossier>) -> ApiResult<Dossier> {
    Ok(ApiResponse::created(dossier_service::create(payload).await?))
}

pub async fn dossier_delete(Path(id): Path<Uuid>) -> ApiResult<Value> {
    dossier_service::delete(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
