use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::hierarchy::HierarchyRecord;

/// A classification category in the archival filing plan. Series form an
/// unbounded hierarchy; `level` is derived server-side and never trusted
/// from client input.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Serie {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    /// 1 for roots, parent.level + 1 otherwise
    pub level: i32,
    /// Durée de conservation légale (years)
    pub dcl: i32,
    /// Durée d'utilité administrative (years)
    pub dua: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HierarchyRecord for Serie {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    fn sort_name(&self) -> &str {
        &self.name
    }
}
