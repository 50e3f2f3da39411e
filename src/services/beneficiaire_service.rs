use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Beneficiaire;
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBeneficiaire {
    pub code: String,
    pub name: String,
    pub structure_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBeneficiaire {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub structure_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

async fn ensure_structure_exists(
    conn: &mut sqlx::PgConnection,
    structure_id: Uuid,
) -> ServiceResult<()> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM structures WHERE id = $1")
        .bind(structure_id)
        .fetch_optional(conn)
        .await?;
    if row.is_none() {
        return Err(ServiceError::NotFound("Structure non trouvée".to_string()));
    }
    Ok(())
}

pub async fn list() -> ServiceResult<Vec<Beneficiaire>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, Beneficiaire>("SELECT * FROM beneficiaires ORDER BY name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

pub async fn get(id: Uuid) -> ServiceResult<Beneficiaire> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query_as::<_, Beneficiaire>("SELECT * FROM beneficiaires WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Bénéficiaire non trouvé".to_string()))
}

pub async fn create(input: CreateBeneficiaire) -> ServiceResult<Beneficiaire> {
    require_non_blank(&input.code, "code")?;
    require_non_blank(&input.name, "nom")?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    if let Some(structure_id) = input.structure_id {
        ensure_structure_exists(&mut *tx, structure_id).await?;
    }

    let beneficiaire = sqlx::query_as::<_, Beneficiaire>(
        "INSERT INTO beneficiaires (code, name, structure_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(input.code.trim())
    .bind(input.name.trim())
    .bind(input.structure_id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "beneficiaire",
        Some(beneficiaire.id),
        &format!("Bénéficiaire {} créé", beneficiaire.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::BENEFICIAIRES]).await;
    Ok(beneficiaire)
}

pub async fn update(id: Uuid, input: UpdateBeneficiaire) -> ServiceResult<Beneficiaire> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Beneficiaire>("SELECT * FROM beneficiaires WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Bénéficiaire non trouvé".to_string()))?;

    let code = input.code.unwrap_or(current.code);
    let name = input.name.unwrap_or(current.name);
    require_non_blank(&code, "code")?;
    require_non_blank(&name, "nom")?;

    let structure_id = match input.structure_id {
        None => current.structure_id,
        Some(structure) => {
            if let Some(sid) = structure {
                ensure_structure_exists(&mut *tx, sid).await?;
            }
            structure
        }
    };

    let beneficiaire = sqlx::query_as::<_, Beneficiaire>(
        "UPDATE beneficiaires SET code = $1, name = $2, structure_id = $3, is_active = $4, \
         updated_at = NOW() WHERE id = $5 RETURNING *",
    )
    .bind(code.trim())
    .bind(name.trim())
    .bind(structure_id)
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "modification",
        "beneficiaire",
        Some(id),
        &format!("Bénéficiaire {} mis à jour", beneficiaire.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::BENEFICIAIRES]).await;
    Ok(beneficiaire)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Beneficiaire>("SELECT * FROM beneficiaires WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Bénéficiaire non trouvé".to_string()))?;

    sqlx::query("DELETE FROM beneficiaires WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "beneficiaire",
        Some(id),
        &format!("Bénéficiaire {} supprimé", existing.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::BENEFICIAIRES]).await;
    Ok(())
}
