use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Liasse;
use crate::hierarchy;
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLiasse {
    pub serie_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLiasse {
    pub serie_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

async fn ensure_serie_exists(
    conn: &mut sqlx::PgConnection,
    serie_id: Uuid,
) -> ServiceResult<()> {
    let serie: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM series WHERE id = $1")
        .bind(serie_id)
        .fetch_optional(conn)
        .await?;
    if serie.is_none() {
        return Err(ServiceError::NotFound("Série non trouvée".to_string()));
    }
    Ok(())
}

pub async fn list() -> ServiceResult<Vec<Liasse>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, Liasse>("SELECT * FROM liasses ORDER BY name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

pub async fn get(id: Uuid) -> ServiceResult<Liasse> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query_as::<_, Liasse>("SELECT * FROM liasses WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Liasse non trouvée".to_string()))
}

pub async fn create(input: CreateLiasse) -> ServiceResult<Liasse> {
    require_non_blank(&input.name, "nom")?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    ensure_serie_exists(&mut *tx, input.serie_id).await?;

    let liasse = sqlx::query_as::<_, Liasse>(
        "INSERT INTO liasses (serie_id, name, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(input.serie_id)
    .bind(input.name.trim())
    .bind(&input.description)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "liasse",
        Some(liasse.id),
        &format!("Liasse {} créée", liasse.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::LIASSES]).await;
    Ok(liasse)
}

pub async fn update(id: Uuid, input: UpdateLiasse) -> ServiceResult<Liasse> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Liasse>("SELECT * FROM liasses WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Liasse non trouvée".to_string()))?;

    let name = input.name.unwrap_or(current.name);
    require_non_blank(&name, "nom")?;

    let serie_id = input.serie_id.unwrap_or(current.serie_id);
    if serie_id != current.serie_id {
        ensure_serie_exists(&mut *tx, serie_id).await?;
    }

    let updated = sqlx::query_as::<_, Liasse>(
        "UPDATE liasses SET serie_id = $1, name = $2, description = $3, is_active = $4, \
         updated_at = NOW() WHERE id = $5 RETURNING *",
    )
    .bind(serie_id)
    .bind(name.trim())
    .bind(input.description.or(current.description))
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "modification",
        "liasse",
        Some(id),
        &format!("Liasse {} mise à jour", updated.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::LIASSES]).await;
    Ok(updated)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Liasse>("SELECT * FROM liasses WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Liasse non trouvée".to_string()))?;

    let (documents,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM documents WHERE liasse_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if let Some(msg) = hierarchy::dependent_block_message(documents, "document(s) rattaché(s)") {
        return Err(ServiceError::Guard(msg));
    }

    sqlx::query("DELETE FROM liasses WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "liasse",
        Some(id),
        &format!("Liasse {} supprimée", existing.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::LIASSES]).await;
    Ok(())
}
