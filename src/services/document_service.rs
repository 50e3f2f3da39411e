use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Document;
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    pub reference: String,
    pub intitule: String,
    pub liasse_id: Uuid,
    pub type_document_id: Option<Uuid>,
}

pub async fn list() -> ServiceResult<Vec<Document>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, Document>("SELECT * FROM documents ORDER BY reference ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

pub async fn create(input: CreateDocument) -> ServiceResult<Document> {
    require_non_blank(&input.reference, "référence")?;
    require_non_blank(&input.intitule, "intitulé")?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let liasse: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM liasses WHERE id = $1")
        .bind(input.liasse_id)
        .fetch_optional(&mut *tx)
        .await?;
    if liasse.is_none() {
        return Err(ServiceError::NotFound("Liasse non trouvée".to_string()));
    }

    if let Some(type_id) = input.type_document_id {
        let type_doc: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM types_document WHERE id = $1")
                .bind(type_id)
                .fetch_optional(&mut *tx)
                .await?;
        if type_doc.is_none() {
            return Err(ServiceError::NotFound(
                "Type de document non trouvé".to_string(),
            ));
        }
    }

    let document = sqlx::query_as::<_, Document>(
        "INSERT INTO documents (reference, intitule, liasse_id, type_document_id) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(input.reference.trim())
    .bind(input.intitule.trim())
    .bind(input.liasse_id)
    .bind(input.type_document_id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "document",
        Some(document.id),
        &format!("Document {} créé", document.reference),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::DOCUMENTS]).await;
    Ok(document)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Document non trouvé".to_string()))?;

    sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "document",
        Some(id),
        &format!("Document {} supprimé", existing.reference),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::DOCUMENTS]).await;
    Ok(())
}
