//! Hierarchy bookkeeping for the self-referencing entities (Serie,
//! Localisation, Structure): level derivation, depth caps, cycle guard,
//! descendant releveling, deletion-guard messages and tree assembly.

pub mod store;
pub mod tree;

use thiserror::Error;
use uuid::Uuid;

pub use store::{HierarchyStore, PgTableStore};
pub use tree::{assemble_forest, Forest, HierarchyRecord, TreeNode};

#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("Élément parent non trouvé")]
    ParentNotFound,

    #[error("Profondeur maximale atteinte (niveau {max} au plus)")]
    MaxDepth { max: i32 },

    #[error("Déplacement impossible : l'élément deviendrait son propre ancêtre")]
    Cycle,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Depth level for a node about to be created or reparented: 1 for roots,
/// parent.level + 1 otherwise. A dangling parent reference is rejected, and
/// a parent already at `max_level` (when the entity carries a cap) blocks
/// the operation before any write happens.
pub async fn resolve_child_level<S: HierarchyStore + Send>(
    store: &mut S,
    parent_id: Option<Uuid>,
    max_level: Option<i32>,
) -> Result<i32, HierarchyError> {
    match parent_id {
        None => Ok(1),
        Some(pid) => {
            let parent_level = store
                .level_of(pid)
                .await?
                .ok_or(HierarchyError::ParentNotFound)?;
            ensure_depth(parent_level, max_level)?;
            Ok(parent_level + 1)
        }
    }
}

/// Reject when the candidate parent sits at or beyond the cap
pub fn ensure_depth(parent_level: i32, max_level: Option<i32>) -> Result<(), HierarchyError> {
    if let Some(max) = max_level {
        if parent_level >= max {
            return Err(HierarchyError::MaxDepth { max });
        }
    }
    Ok(())
}

/// Walk the new parent's ancestor chain and reject the reparent if the node
/// itself appears in it. Iterative, bounded by `max_hops`; a chain longer
/// than the bound is treated as cyclic.
pub async fn ensure_no_cycle<S: HierarchyStore + Send>(
    store: &mut S,
    node_id: Uuid,
    new_parent_id: Option<Uuid>,
    max_hops: u32,
) -> Result<(), HierarchyError> {
    let Some(start) = new_parent_id else {
        return Ok(());
    };

    let mut current = Some(start);
    let mut hops = 0u32;
    while let Some(id) = current {
        if id == node_id {
            return Err(HierarchyError::Cycle);
        }
        hops += 1;
        if hops > max_hops {
            return Err(HierarchyError::Cycle);
        }
        current = store.parent_of(id).await?;
    }
    Ok(())
}

/// After a reparent changed `root`'s level, push the new levels down to every
/// descendant so `level == parent.level + 1` holds transitively. Breadth-first,
/// bounded by the entity's depth cap.
pub async fn relevel_descendants<S: HierarchyStore + Send>(
    store: &mut S,
    root_id: Uuid,
    root_level: i32,
) -> Result<(), HierarchyError> {
    let mut frontier = vec![(root_id, root_level)];
    while let Some((id, level)) = frontier.pop() {
        for child in store.children_of(id).await? {
            store.set_level(child, level + 1).await?;
            frontier.push((child, level + 1));
        }
    }
    Ok(())
}

/// Deletion-guard message naming the blocking dependent count, or `None`
/// when the delete may proceed. Callers pass a French label such as
/// "sous-localisation(s) rattachée(s)" or "document(s) rattaché(s)".
pub fn dependent_block_message(count: i64, label: &str) -> Option<String> {
    (count > 0).then(|| format!("Impossible de supprimer : {} {}", count, label))
}

#[cfg(test)]
mod tests {
    use super::store::MemoryStore;
    use super::*;

    fn id() -> Uuid {
        Uuid::new_v4()
    }

    #[tokio::test]
    async fn root_level_is_one() {
        let mut store = MemoryStore::new();
        let level = resolve_child_level(&mut store, None, Some(5)).await.unwrap();
        assert_eq!(level, 1);
    }

    #[tokio::test]
    async fn child_level_is_parent_plus_one() {
        let mut store = MemoryStore::new();
        let root = id();
        store.insert(root, None, 1);
        let child = id();
        store.insert(child, Some(root), 2);

        assert_eq!(
            resolve_child_level(&mut store, Some(root), None).await.unwrap(),
            2
        );
        assert_eq!(
            resolve_child_level(&mut store, Some(child), None).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn dangling_parent_is_rejected() {
        let mut store = MemoryStore::new();
        let err = resolve_child_level(&mut store, Some(id()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::ParentNotFound));
    }

    #[tokio::test]
    async fn parent_at_cap_blocks_creation() {
        let mut store = MemoryStore::new();
        let deep = id();
        store.insert(deep, None, 5);

        let err = resolve_child_level(&mut store, Some(deep), Some(5))
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::MaxDepth { max: 5 }));

        // Uncapped entities accept the same parent
        assert_eq!(
            resolve_child_level(&mut store, Some(deep), None).await.unwrap(),
            6
        );
    }

    #[tokio::test]
    async fn reparenting_under_own_descendant_is_a_cycle() {
        let mut store = MemoryStore::new();
        let a = id();
        let b = id();
        let c = id();
        store.insert(a, None, 1);
        store.insert(b, Some(a), 2);
        store.insert(c, Some(b), 3);

        // a -> c would close the loop a -> b -> c -> a
        let err = ensure_no_cycle(&mut store, a, Some(c), 64).await.unwrap_err();
        assert!(matches!(err, HierarchyError::Cycle));

        // self-parenting is the degenerate case
        let err = ensure_no_cycle(&mut store, a, Some(a), 64).await.unwrap_err();
        assert!(matches!(err, HierarchyError::Cycle));

        // moving c under a is fine (already transitively true)
        ensure_no_cycle(&mut store, c, Some(a), 64).await.unwrap();
    }

    #[tokio::test]
    async fn relevel_updates_all_descendants() {
        let mut store = MemoryStore::new();
        let a = id();
        let b = id();
        let c = id();
        let d = id();
        store.insert(a, None, 1);
        store.insert(b, Some(a), 2);
        store.insert(c, Some(b), 3);
        store.insert(d, Some(b), 3);

        // Pretend a was moved under a level-2 node: a is now level 3
        relevel_descendants(&mut store, a, 3).await.unwrap();

        assert_eq!(store.level_of(b).await.unwrap(), Some(4));
        assert_eq!(store.level_of(c).await.unwrap(), Some(5));
        assert_eq!(store.level_of(d).await.unwrap(), Some(5));
    }

    #[test]
    fn block_message_names_the_count() {
        assert_eq!(dependent_block_message(0, "document(s) rattaché(s)"), None);
        let msg = dependent_block_message(2, "sous-localisation(s) rattachée(s)").unwrap();
        assert!(msg.contains('2'));
        assert!(msg.contains("sous-localisation"));
    }
}
