use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::Serie;
use crate::hierarchy::{self, Forest, PgTableStore};
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSerie {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub dcl: i32,
    pub dua: i32,
}

/// Partial update; `parentId` distinguishes absent (keep) from null (move to
/// root) via the double Option.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSerie {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Option<Uuid>>,
    pub dcl: Option<i32>,
    pub dua: Option<i32>,
    pub is_active: Option<bool>,
}

fn validate_durations(dcl: i32, dua: i32) -> ServiceResult<()> {
    if dcl < 0 || dua < 0 {
        return Err(ServiceError::Validation(
            "Les durées DCL et DUA doivent être positives".to_string(),
        ));
    }
    Ok(())
}

pub async fn list() -> ServiceResult<Vec<Serie>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, Serie>("SELECT * FROM series ORDER BY level ASC, name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

pub async fn get(id: Uuid) -> ServiceResult<Serie> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query_as::<_, Serie>("SELECT * FROM series WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Série non trouvée".to_string()))
}

/// Full filing plan as a forest; orphans are surfaced, not hidden
pub async fn tree() -> ServiceResult<Forest<Serie>> {
    let rows = list().await?;
    let forest = hierarchy::assemble_forest(rows);
    if !forest.orphans.is_empty() {
        tracing::warn!(count = forest.orphans.len(), "orphaned series in tree view");
    }
    Ok(forest)
}

pub async fn create(input: CreateSerie) -> ServiceResult<Serie> {
    require_non_blank(&input.code, "code")?;
    require_non_blank(&input.name, "nom")?;
    validate_durations(input.dcl, input.dua)?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let code = input.code.trim();
    let duplicate: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM series WHERE code = $1")
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Guard(format!(
            "Une série avec le code {} existe déjà",
            code
        )));
    }

    let level = {
        let mut store = PgTableStore::series(&mut *tx);
        hierarchy::resolve_child_level(
            &mut store,
            input.parent_id,
            config::config().hierarchy.serie_max_level,
        )
        .await?
    };

    let serie = sqlx::query_as::<_, Serie>(
        "INSERT INTO series (code, name, description, parent_id, level, dcl, dua) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(code)
    .bind(input.name.trim())
    .bind(&input.description)
    .bind(input.parent_id)
    .bind(level)
    .bind(input.dcl)
    .bind(input.dua)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "serie",
        Some(serie.id),
        &format!("Série {} ({}) créée", serie.code, serie.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::SERIES]).await;
    Ok(serie)
}

pub async fn update(id: Uuid, input: UpdateSerie) -> ServiceResult<Serie> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Serie>("SELECT * FROM series WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Série non trouvée".to_string()))?;

    let code = input.code.unwrap_or(current.code);
    let name = input.name.unwrap_or(current.name);
    require_non_blank(&code, "code")?;
    require_non_blank(&name, "nom")?;
    let dcl = input.dcl.unwrap_or(current.dcl);
    let dua = input.dua.unwrap_or(current.dua);
    validate_durations(dcl, dua)?;

    let (parent_id, parent_changed) = match input.parent_id {
        None => (current.parent_id, false),
        Some(parent) => (parent, parent != current.parent_id),
    };

    // Level is recomputed server-side on reparent, never trusted from input
    let mut level = current.level;
    if parent_changed {
        let mut store = PgTableStore::series(&mut *tx);
        hierarchy::ensure_no_cycle(
            &mut store,
            id,
            parent_id,
            config::config().hierarchy.max_ancestor_hops,
        )
        .await?;
        level = hierarchy::resolve_child_level(
            &mut store,
            parent_id,
            config::config().hierarchy.serie_max_level,
        )
        .await?;
    }

    let updated = sqlx::query_as::<_, Serie>(
        "UPDATE series SET code = $1, name = $2, description = $3, parent_id = $4, \
         level = $5, dcl = $6, dua = $7, is_active = $8, updated_at = NOW() \
         WHERE id = $9 RETURNING *",
    )
    .bind(code.trim())
    .bind(name.trim())
    .bind(input.description.or(current.description))
    .bind(parent_id)
    .bind(level)
    .bind(dcl)
    .bind(dua)
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if parent_changed {
        let mut store = PgTableStore::series(&mut *tx);
        hierarchy::relevel_descendants(&mut store, id, level).await?;
    }

    journal_service::record(
        &mut *tx,
        "modification",
        "serie",
        Some(id),
        &format!("Série {} mise à jour", updated.code),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::SERIES]).await;
    Ok(updated)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Serie>("SELECT * FROM series WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Série non trouvée".to_string()))?;

    let (children,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM series WHERE parent_id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if let Some(msg) = hierarchy::dependent_block_message(children, "sous-série(s) rattachée(s)") {
        return Err(ServiceError::Guard(msg));
    }

    let (liasses,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM liasses WHERE serie_id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if let Some(msg) = hierarchy::dependent_block_message(liasses, "liasse(s) rattachée(s)") {
        return Err(ServiceError::Guard(msg));
    }

    sqlx::query("DELETE FROM series WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "serie",
        Some(id),
        &format!("Série {} supprimée", existing.code),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::SERIES]).await;
    Ok(())
}
