use futures::try_join;
use serde::Serialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::JournalEntry;

use super::ServiceResult;

/// Append an audit entry inside the caller's transaction. A no-op when
/// audit logging is disabled.
pub async fn record(
    conn: &mut PgConnection,
    action: &str,
    entite: &str,
    entite_id: Option<Uuid>,
    detail: &str,
    utilisateur: Option<&str>,
) -> Result<(), sqlx::Error> {
    if !config::config().security.enable_audit_logging {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO journal (action, entite, entite_id, detail, utilisateur) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(action)
    .bind(entite)
    .bind(entite_id)
    .bind(detail)
    .bind(utilisateur)
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalPage {
    pub entries: Vec<JournalEntry>,
    pub total: i64,
}

/// Most recent entries first
pub async fn list(limit: i64) -> ServiceResult<JournalPage> {
    let pool = DatabaseManager::pool().await?;
    let limit = limit.clamp(1, 500);

    let entries = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&pool);
    let total = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM journal").fetch_one(&pool);

    let (entries, total) = try_join!(entries, total)?;
    Ok(JournalPage {
        entries,
        total: total.0,
    })
}
