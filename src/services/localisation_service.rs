use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::Localisation;
use crate::hierarchy::{self, Forest, PgTableStore};
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocalisation {
    pub code: String,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocalisation {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

fn max_level() -> Option<i32> {
    Some(config::config().hierarchy.localisation_max_level)
}

pub async fn list() -> ServiceResult<Vec<Localisation>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, Localisation>(
        "SELECT * FROM localisations ORDER BY level ASC, name ASC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(rows)
}

pub async fn get(id: Uuid) -> ServiceResult<Localisation> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query_as::<_, Localisation>("SELECT * FROM localisations WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Localisation non trouvée".to_string()))
}

pub async fn tree() -> ServiceResult<Forest<Localisation>> {
    let rows = list().await?;
    let forest = hierarchy::assemble_forest(rows);
    if !forest.orphans.is_empty() {
        tracing::warn!(
            count = forest.orphans.len(),
            "orphaned localisations in tree view"
        );
    }
    Ok(forest)
}

pub async fn create(input: CreateLocalisation) -> ServiceResult<Localisation> {
    require_non_blank(&input.code, "code")?;
    require_non_blank(&input.name, "nom")?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let code = input.code.trim();
    let duplicate: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM localisations WHERE code = $1")
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Guard(format!(
            "Une localisation avec le code {} existe déjà",
            code
        )));
    }

    let level = {
        let mut store = PgTableStore::localisations(&mut *tx);
        hierarchy::resolve_child_level(&mut store, input.parent_id, max_level()).await?
    };

    let localisation = sqlx::query_as::<_, Localisation>(
        "INSERT INTO localisations (code, name, parent_id, level) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(code)
    .bind(input.name.trim())
    .bind(input.parent_id)
    .bind(level)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "creation",
        "localisation",
        Some(localisation.id),
        &format!("Localisation {} ({}) créée", localisation.code, localisation.name),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::LOCALISATIONS]).await;
    Ok(localisation)
}

pub async fn update(id: Uuid, input: UpdateLocalisation) -> ServiceResult<Localisation> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Localisation>("SELECT * FROM localisations WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Localisation non trouvée".to_string()))?;

    let code = input.code.unwrap_or(current.code);
    let name = input.name.unwrap_or(current.name);
    require_non_blank(&code, "code")?;
    require_non_blank(&name, "nom")?;

    let (parent_id, parent_changed) = match input.parent_id {
        None => (current.parent_id, false),
        Some(parent) => (parent, parent != current.parent_id),
    };

    let mut level = current.level;
    if parent_changed {
        let mut store = PgTableStore::localisations(&mut *tx);
        hierarchy::ensure_no_cycle(
            &mut store,
            id,
            parent_id,
            config::config().hierarchy.max_ancestor_hops,
        )
        .await?;
        level = hierarchy::resolve_child_level(&mut store, parent_id, max_level()).await?;
    }

    let updated = sqlx::query_as::<_, Localisation>(
        "UPDATE localisations SET code = $1, name = $2, parent_id = $3, level = $4, \
         is_active = $5, updated_at = NOW() WHERE id = $6 RETURNING *",
    )
    .bind(code.trim())
    .bind(name.trim())
    .bind(parent_id)
    .bind(level)
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if parent_changed {
        let mut store = PgTableStore::localisations(&mut *tx);
        hierarchy::relevel_descendants(&mut store, id, level).await?;
    }

    journal_service::record(
        &mut *tx,
        "modification",
        "localisation",
        Some(id),
        &format!("Localisation {} mise à jour", updated.code),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::LOCALISATIONS]).await;
    Ok(updated)
}

pub async fn delete(id: Uuid) -> ServiceResult<()> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Localisation>("SELECT * FROM localisations WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Localisation non trouvée".to_string()))?;

    let (children,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM localisations WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if let Some(msg) =
        hierarchy::dependent_block_message(children, "sous-localisation(s) rattachée(s)")
    {
        return Err(ServiceError::Guard(msg));
    }

    let (dossiers,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM dossiers WHERE localisation_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if let Some(msg) = hierarchy::dependent_block_message(dossiers, "dossier(s) référencé(s)") {
        return Err(ServiceError::Guard(msg));
    }

    sqlx::query("DELETE FROM localisations WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    journal_service::record(
        &mut *tx,
        "suppression",
        "localisation",
        Some(id),
        &format!("Localisation {} supprimée", existing.code),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::LOCALISATIONS]).await;
    Ok(())
}
