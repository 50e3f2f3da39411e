use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// General settings row (key/value)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: Uuid,
    pub cle: String,
    pub valeur: String,
    pub updated_at: DateTime<Utc>,
}
