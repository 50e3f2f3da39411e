use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::TypeDocument;
use crate::hierarchy;
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTypeDocument {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTypeDocument {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list() -> ServiceResult<Vec<TypeDocument>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, TypeDocument>("SELECT * FROM types_document ORDER BY name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

pub async fn create(input: CreateTypeDocument) -> ServiceResult<TypeDocument> {
    require_non_blank(&input.name, "nom")?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let name = input.name.trim();
    let duplicate: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM types_document WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Guard(format!(
            "Un type de document nommé {} existe déjà",
            name
        )));
    }

    let type_document = sqlx::query_as::<_, TypeDocument>(
        "INSERT INTO types_document (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(&input.description)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "type_document",
        Some(type_document.id),
        &format!("Type de document {} créé", type_document.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::TYPES_DOCUMENT]).await;
    Ok(type_document)
}

pub async fn update(id: Uuid, input: UpdateTypeDocument) -> ServiceResult<TypeDocument> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, TypeDocument>("SELECT * FROM types_document WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Type de document non trouvé".to_string()))?;

    let name = input.name.unwrap_or(current.name);
    require_non_blank(&name, "nom")?;

    let type_document = sqlx::query_as::<_, TypeDocument>(
        "UPDATE types_document SET name = $1, description = $2, is_active = $3, \
         updated_at = NOW() WHERE id = $4 RETURNING *",
    )
    .bind(name.trim())
    .bind(input.description.or(current.description))
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "modification",
        "type_document",
        Some(id),
        &format!("Type de document {} mis à jour", type_document.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::TYPES_DOCUMENT]).await;
    Ok(type_document)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, TypeDocument>("SELECT * FROM types_document WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Type de document non trouvé".to_string()))?;

    let (documents,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM documents WHERE type_document_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if let Some(msg) = hierarchy::dependent_block_message(documents, "document(s) rattaché(s)") {
        return Err(ServiceError::Guard(msg));
    }

    sqlx::query("DELETE FROM types_document WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "type_document",
        Some(id),
        &format!("Type de document {} supprimé", existing.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::TYPES_DOCUMENT]).await;
    Ok(())
}
