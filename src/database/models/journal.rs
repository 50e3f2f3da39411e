use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit trail entry, written by mutations when audit logging is enabled
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub action: String,
    pub entite: String,
    pub entite_id: Option<Uuid>,
    pub detail: String,
    pub utilisateur: Option<String>,
    pub created_at: DateTime<Utc>,
}
