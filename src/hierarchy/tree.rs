//! Forest assembly for tree views: one pass groups flat rows by parent id,
//! a second pass attaches children recursively.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Implemented by the self-referencing entities so tree assembly can stay
/// generic over them
pub trait HierarchyRecord {
    fn id(&self) -> Uuid;
    fn parent_id(&self) -> Option<Uuid>;
    fn sort_name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<T: HierarchyRecord> {
    #[serde(flatten)]
    pub record: T,
    pub children: Vec<TreeNode<T>>,
}

/// Assembled tree view. Rows whose `parent_id` references an id absent from
/// the input are NOT dropped: they land in `orphans` (with their own
/// subtrees) so callers can surface them instead of hiding them.
#[derive(Debug, Serialize)]
pub struct Forest<T: HierarchyRecord> {
    pub roots: Vec<TreeNode<T>>,
    pub orphans: Vec<TreeNode<T>>,
}

impl<T: HierarchyRecord> Forest<T> {
    /// Total number of nodes across roots and orphans
    pub fn len(&self) -> usize {
        fn count<T: HierarchyRecord>(nodes: &[TreeNode<T>]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.roots) + count(&self.orphans)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.orphans.is_empty()
    }
}

/// Convert a flat list of rows into a forest. Roots and each children list
/// are ordered by name ascending.
pub fn assemble_forest<T: HierarchyRecord>(rows: Vec<T>) -> Forest<T> {
    let ids: HashSet<Uuid> = rows.iter().map(|r| r.id()).collect();

    let mut roots: Vec<T> = Vec::new();
    let mut orphans: Vec<T> = Vec::new();
    let mut by_parent: HashMap<Uuid, Vec<T>> = HashMap::new();

    for row in rows {
        match row.parent_id() {
            None => roots.push(row),
            Some(parent) if ids.contains(&parent) => {
                by_parent.entry(parent).or_default().push(row)
            }
            Some(_) => orphans.push(row),
        }
    }

    roots.sort_by(|a, b| a.sort_name().cmp(b.sort_name()));
    orphans.sort_by(|a, b| a.sort_name().cmp(b.sort_name()));

    Forest {
        roots: roots
            .into_iter()
            .map(|r| attach(r, &mut by_parent))
            .collect(),
        orphans: orphans
            .into_iter()
            .map(|r| attach(r, &mut by_parent))
            .collect(),
    }
}

fn attach<T: HierarchyRecord>(record: T, by_parent: &mut HashMap<Uuid, Vec<T>>) -> TreeNode<T> {
    let mut children = by_parent.remove(&record.id()).unwrap_or_default();
    children.sort_by(|a, b| a.sort_name().cmp(b.sort_name()));
    TreeNode {
        record,
        children: children
            .into_iter()
            .map(|c| attach(c, by_parent))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize)]
    struct Rec {
        id: Uuid,
        parent_id: Option<Uuid>,
        name: String,
    }

    impl HierarchyRecord for Rec {
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

    fn rec(name: &str, parent: Option<Uuid>) -> Rec {
        Rec {
            id: Uuid::new_v4(),
            parent_id: parent,
            name: name.to_string(),
        }
    }

    #[test]
    fn valid_forest_round_trips() {
        let batiment = rec("Bâtiment 1", None);
        let salle = rec("Salle 101", Some(batiment.id));
        let etagere = rec("Étagère A", Some(salle.id));
        let annexe = rec("Annexe", None);

        let forest = assemble_forest(vec![
            etagere.clone(),
            salle.clone(),
            batiment.clone(),
            annexe.clone(),
        ]);

        assert_eq!(forest.len(), 4);
        assert!(forest.orphans.is_empty());

        // Roots ordered by name: Annexe before Bâtiment 1
        assert_eq!(forest.roots[0].record.name, "Annexe");
        assert_eq!(forest.roots[1].record.name, "Bâtiment 1");

        // Position matches the parent chain
        let b = &forest.roots[1];
        assert_eq!(b.children.len(), 1);
        assert_eq!(b.children[0].record.id, salle.id);
        assert_eq!(b.children[0].children[0].record.id, etagere.id);
    }

    #[test]
    fn children_are_ordered_by_name() {
        let root = rec("Racine", None);
        let zulu = rec("Zulu", Some(root.id));
        let alpha = rec("Alpha", Some(root.id));
        let mike = rec("Mike", Some(root.id));

        let forest = assemble_forest(vec![root, zulu, alpha, mike]);
        let names: Vec<&str> = forest.roots[0]
            .children
            .iter()
            .map(|c| c.record.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "Mike", "Zulu"]);
    }

    #[test]
    fn orphans_are_surfaced_with_their_subtrees() {
        let root = rec("Racine", None);
        let orphan = rec("Orpheline", Some(Uuid::new_v4()));
        let orphan_child = rec("Fille", Some(orphan.id));

        let forest = assemble_forest(vec![root, orphan.clone(), orphan_child.clone()]);

        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.orphans.len(), 1);
        assert_eq!(forest.orphans[0].record.id, orphan.id);
        // The orphan keeps its own descendants
        assert_eq!(forest.orphans[0].children[0].record.id, orphan_child.id);
        // Nothing was lost
        assert_eq!(forest.len(), 3);
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        let forest = assemble_forest(Vec::<Rec>::new());
        assert!(forest.is_empty());
        assert_eq!(forest.len(), 0);
    }
}
