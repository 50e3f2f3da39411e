use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::Structure;
use crate::hierarchy::{self, Forest, PgTableStore};
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStructure {
    pub code: String,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStructure {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

fn max_level() -> Option<i32> {
    Some(config::config().hierarchy.structure_max_level)
}

pub async fn list() -> ServiceResult<Vec<Structure>> {
    let pool = DatabaseManager::pool().await?;
    let rows =
        sqlx::query_as::<_, Structure>("SELECT * FROM structures ORDER BY niveau ASC, name ASC")
            .fetch_all(&pool)
            .await?;
    Ok(rows)
}

pub async fn get(id: Uuid) -> ServiceResult<Structure> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query_as::<_, Structure>("SELECT * FROM structures WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Structure non trouvée".to_string()))
}

pub async fn tree() -> ServiceResult<Forest<Structure>> {
    let rows = list().await?;
    let forest = hierarchy::assemble_forest(rows);
    if !forest.orphans.is_empty() {
        tracing::warn!(
            count = forest.orphans.len(),
            "orphaned structures in tree view"
        );
    }
    Ok(forest)
}

pub async fn create(input: CreateStructure) -> ServiceResult<Structure> {
    require_non_blank(&input.code, "code")?;
    require_non_blank(&input.name, "nom")?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let niveau = {
        let mut store = PgTableStore::structures(&mut *tx);
        hierarchy::resolve_child_level(&mut store, input.parent_id, max_level()).await?
    };

    let structure = sqlx::query_as::<_, Structure>(
        "INSERT INTO structures (code, name, parent_id, niveau) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(input.code.trim())
    .bind(input.name.trim())
    .bind(input.parent_id)
    .bind(niveau)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "structure",
        Some(structure.id),
        &format!("Structure {} ({}) créée", structure.code, structure.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::STRUCTURES]).await;
    Ok(structure)
}

pub async fn update(id: Uuid, input: UpdateStructure) -> ServiceResult<Structure> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Structure>("SELECT * FROM structures WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Structure non trouvée".to_string()))?;

    let code = input.code.unwrap_or(current.code);
    let name = input.name.unwrap_or(current.name);
    require_non_blank(&code, "code")?;
    require_non_blank(&name, "nom")?;

    let (parent_id, parent_changed) = match input.parent_id {
        None => (current.parent_id, false),
        Some(parent) => (parent, parent != current.parent_id),
    };

    let mut niveau = current.niveau;
    if parent_changed {
        let mut store = PgTableStore::structures(&mut *tx);
        hierarchy::ensure_no_cycle(
            &mut store,
            id,
            parent_id,
            config::config().hierarchy.max_ancestor_hops,
        )
        .await?;
        niveau = hierarchy::resolve_child_level(&mut store, parent_id, max_level()).await?;
    }

    let updated = sqlx::query_as::<_, Structure>(
        "UPDATE structures SET code = $1, name = $2, parent_id = $3, niveau = $4, \
         is_active = $5, updated_at = NOW() WHERE id = $6 RETURNING *",
    )
    .bind(code.trim())
    .bind(name.trim())
    .bind(parent_id)
    .bind(niveau)
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if parent_changed {
        let mut store = PgTableStore::structures(&mut *tx);
        hierarchy::relevel_descendants(&mut store, id, niveau).await?;
    }

    journal_service::record(
        &mut *tx,
        "modification",
        "structure",
        Some(id),
        &format!("Structure {} mise à jour", updated.code),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::STRUCTURES]).await;
    Ok(updated)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Structure>("SELECT * FROM structures WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Structure non trouvée".to_string()))?;

    let (children,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM structures WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if let Some(msg) =
        hierarchy::dependent_block_message(children, "sous-structure(s) rattachée(s)")
    {
        return Err(ServiceError::Guard(msg));
    }

    let (beneficiaires,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM beneficiaires WHERE structure_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if let Some(msg) =
        hierarchy::dependent_block_message(beneficiaires, "bénéficiaire(s) rattaché(s)")
    {
        return Err(ServiceError::Guard(msg));
    }

    sqlx::query("DELETE FROM structures WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "structure",
        Some(id),
        &format!("Structure {} supprimée", existing.code),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::STRUCTURES]).await;
    Ok(())
}
