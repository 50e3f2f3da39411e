use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Dossier;
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDossier {
    pub reference: String,
    pub intitule: String,
    pub localisation_id: Option<Uuid>,
}

pub async fn list() -> ServiceResult<Vec<Dossier>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, Dossier>("SELECT * FROM dossiers ORDER BY reference ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

pub async fn create(input: CreateDossier) -> ServiceResult<Dossier> {
    require_non_blank(&input.reference, "référence")?;
    require_non_blank(&input.intitule, "intitulé")?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    if let Some(loc_id) = input.localisation_id {
        let loc: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM localisations WHERE id = $1")
            .bind(loc_id)
            .fetch_optional(&mut *tx)
            .await?;
        if loc.is_none() {
            return Err(ServiceError::NotFound(
                "Localisation non trouvée".to_string(),
            ));
        }
    }

    let dossier = sqlx::query_as::<_, Dossier>(
        "INSERT INTO dossiers (reference, intitule, localisation_id) \
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(input.reference.trim())
    .bind(input.intitule.trim())
    .bind(input.localisation_id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "dossier",
        Some(dossier.id),
        &format!("Dossier {} créé", dossier.reference),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::DOSSIERS]).await;
    Ok(dossier)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Dossier>("SELECT * FROM dossiers WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Dossier non trouvé".to_string()))?;

    sqlx::query("DELETE FROM dossiers WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "dossier",
        Some(id),
        &format!("Dossier {} supprimé", existing.reference),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::DOSSIERS]).await;
    Ok(())
}
