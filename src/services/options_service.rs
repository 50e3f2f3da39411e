use serde::Deserialize;

use crate::database::manager::DatabaseManager;
use crate::database::models::Setting;
use crate::revalidate;
use crate::services::journal_service;

use super::{require_non_blank, ServiceResult};

#[derive(Debug, Deserialize)]
pub struct SetOption {
    pub valeur: String,
}

pub async fn list() -> ServiceResult<Vec<Setting>> {
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query_as::<_, Setting>("SELECT * FROM options ORDER BY cle ASC")
        .fetch_all(&pool)
        .await?;
    Ok(rows)
}

/// Upsert one setting by key
pub async fn set(cle: &str, input: SetOption) -> ServiceResult<Setting> {
    require_non_blank(cle, "clé")?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, Setting>(
        "INSERT INTO options (cle, valeur) VALUES ($1, $2) \
         ON CONFLICT (cle) DO UPDATE SET valeur = EXCLUDED.valeur, updated_at = NOW() \
         RETURNING *",
    )
    .bind(cle.trim())
    .bind(&input.valeur)
    .fetch_one(&mut *tx)
    .await?;

    journal_service::record(
        &mut *tx,
        "modification",
        "option",
        Some(row.id),
        &format!("Paramètre {} mis à jour", row.cle),
        None,
    )
    .await?;

    tx.commit().await?;
    revalidate::mark(&[revalidate::OPTIONS]).await;
    Ok(row)
}
