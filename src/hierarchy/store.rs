//! Async seam between the hierarchy logic and storage. The Postgres
//! implementation runs inside the caller's transaction so guard reads and
//! writes stay atomic.

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use super::HierarchyError;

#[async_trait]
pub trait HierarchyStore {
    /// Stored depth of the row, or `None` when the row does not exist
    async fn level_of(&mut self, id: Uuid) -> Result<Option<i32>, HierarchyError>;

    /// Parent link of the row (`None` for roots and missing rows)
    async fn parent_of(&mut self, id: Uuid) -> Result<Option<Uuid>, HierarchyError>;

    /// Ids of the direct children of `id`
    async fn children_of(&mut self, id: Uuid) -> Result<Vec<Uuid>, HierarchyError>;

    /// Overwrite the stored depth of `id`
    async fn set_level(&mut self, id: Uuid, level: i32) -> Result<(), HierarchyError>;
}

/// Postgres-backed store over one self-referencing table. Table and column
/// names are compile-time constants (see the constructors), never user input.
pub struct PgTableStore<'c> {
    conn: &'c mut PgConnection,
    table: &'static str,
    level_column: &'static str,
}

impl<'c> PgTableStore<'c> {
    pub fn new(conn: &'c mut PgConnection, table: &'static str, level_column: &'static str) -> Self {
        Self {
            conn,
            table,
            level_column,
        }
    }

    pub fn series(conn: &'c mut PgConnection) -> Self {
        Self::new(conn, "series", "level")
    }

    pub fn localisations(conn: &'c mut PgConnection) -> Self {
        Self::new(conn, "localisations", "level")
    }

    pub fn structures(conn: &'c mut PgConnection) -> Self {
        Self::new(conn, "structures", "niveau")
    }
}

#[async_trait]
impl<'c> HierarchyStore for PgTableStore<'c> {
    async fn level_of(&mut self, id: Uuid) -> Result<Option<i32>, HierarchyError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            self.level_column, self.table
        );
        let row: Option<(i32,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.map(|r| r.0))
    }

    async fn parent_of(&mut self, id: Uuid) -> Result<Option<Uuid>, HierarchyError> {
        let sql = format!("SELECT parent_id FROM {} WHERE id = $1", self.table);
        let row: Option<(Option<Uuid>,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.and_then(|r| r.0))
    }

    async fn children_of(&mut self, id: Uuid) -> Result<Vec<Uuid>, HierarchyError> {
        let sql = format!("SELECT id FROM {} WHERE parent_id = $1", self.table);
        let rows: Vec<(Uuid,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn set_level(&mut self, id: Uuid, level: i32) -> Result<(), HierarchyError> {
        let sql = format!(
            "UPDATE {} SET {} = $1, updated_at = NOW() WHERE id = $2",
            self.table, self.level_column
        );
        sqlx::query(&sql)
            .bind(level)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}

/// In-memory store for unit tests
#[cfg(test)]
pub struct MemoryStore {
    nodes: std::collections::HashMap<Uuid, (Option<Uuid>, i32)>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self {
            nodes: std::collections::HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: Uuid, parent_id: Option<Uuid>, level: i32) {
        self.nodes.insert(id, (parent_id, level));
    }
}

#[cfg(test)]
#[async_trait]
impl HierarchyStore for MemoryStore {
    async fn level_of(&mut self, id: Uuid) -> Result<Option<i32>, HierarchyError> {
        Ok(self.nodes.get(&id).map(|(_, level)| *level))
    }

    async fn parent_of(&mut self, id: Uuid) -> Result<Option<Uuid>, HierarchyError> {
        Ok(self.nodes.get(&id).and_then(|(parent, _)| *parent))
    }

    async fn children_of(&mut self, id: Uuid) -> Result<Vec<Uuid>, HierarchyError> {
        let mut children: Vec<Uuid> = self
            .nodes
            .iter()
            .filter(|(_, (parent, _))| *parent == Some(id))
            .map(|(child, _)| *child)
            .collect();
        children.sort();
        Ok(children)
    }

    async fn set_level(&mut self, id: Uuid, level: i32) -> Result<(), HierarchyError> {
        if let Some(entry) = self.nodes.get_mut(&id) {
            entry.1 = level;
        }
        Ok(())
    }
}
