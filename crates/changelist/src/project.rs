//! Visibility projection and row lookups over node tables.

use crate::types::{Node, NodeId, NodeTable};

/// Visible nodes in display order.
///
/// The result is exactly the row set handed to the list view: one row per
/// element, ordered by `display_index`.
///
/// # Examples
///
/// ```
/// use changelist::v1::{ChangeRecord, ChangeStatus, project, synthesize};
///
/// let changes = vec![
///     ChangeRecord::new("readme.md", ChangeStatus::Modified),
///     ChangeRecord::new("doc.sketch/page1/layer1", ChangeStatus::Modified)
///         .with_part_path(["doc.sketch", "page1", "layer1"]),
/// ];
///
/// let rows = project(&synthesize(&changes, None));
/// let labels: Vec<&str> = rows.iter().map(|n| n.label()).collect();
/// assert_eq!(labels, vec!["readme.md", "doc.sketch"]);
/// ```
pub fn project(table: &NodeTable) -> Vec<Node> {
    let mut rows: Vec<Node> = table.iter().filter(|n| n.visible()).cloned().collect();
    rows.sort_by_key(Node::display_index);
    rows
}

/// Row index of `id` within a projected view.
pub fn row_of(rows: &[Node], id: &NodeId) -> Option<usize> {
    rows.iter().position(|n| &n.id() == id)
}

/// Ids of every group in the table, in display order.
pub fn group_ids(table: &NodeTable) -> Vec<String> {
    let mut groups: Vec<_> = table.groups().collect();
    groups.sort_by_key(|g| g.display_index);
    groups.into_iter().map(|g| g.group_id.clone()).collect()
}

/// Ids of groups carrying a propagated conflict.
pub fn conflicted_groups(table: &NodeTable) -> Vec<&str> {
    let mut groups: Vec<_> = table
        .groups()
        .filter(|g| g.conflict_status.is_some())
        .collect();
    groups.sort_by_key(|g| g.display_index);
    groups.into_iter().map(|g| g.group_id.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesize::synthesize;
    use crate::types::{ChangeRecord, ChangeStatus, ConflictKind};

    fn part(path: &[&str]) -> ChangeRecord {
        ChangeRecord::new(path.join("/"), ChangeStatus::Modified).with_part_path(path.iter().copied())
    }

    #[test]
    fn test_project_empty() {
        assert!(project(&NodeTable::new()).is_empty());
    }

    #[test]
    fn test_project_orders_by_display_index() {
        let changes = vec![
            ChangeRecord::new("z.txt", ChangeStatus::New),
            ChangeRecord::new("a.txt", ChangeStatus::New),
            ChangeRecord::new("m.txt", ChangeStatus::New),
        ];
        let rows = project(&synthesize(&changes, None));
        let labels: Vec<&str> = rows.iter().map(Node::label).collect();
        assert_eq!(labels, vec!["z.txt", "a.txt", "m.txt"]);
    }

    #[test]
    fn test_project_filters_hidden() {
        let table = synthesize(&[part(&["doc.sketch", "page1", "layer1"])], None);
        let rows = project(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), NodeId::group("doc.sketch"));
    }

    #[test]
    fn test_row_of() {
        let changes = vec![
            ChangeRecord::new("a.txt", ChangeStatus::New),
            part(&["doc.sketch", "page1", "layer1"]),
        ];
        let rows = project(&synthesize(&changes, None));
        assert_eq!(row_of(&rows, &NodeId::group("doc.sketch")), Some(1));
        assert_eq!(row_of(&rows, &NodeId::group("doc.sketch/page1")), None);
        assert_eq!(row_of(&rows, &NodeId::file("a.txt")), Some(0));
    }

    #[test]
    fn test_group_ids_and_conflicts() {
        let changes = vec![
            part(&["doc.sketch", "page1", "layer1"]),
            ChangeRecord::new(
                "b.sketch/p/q",
                ChangeStatus::Conflicted {
                    conflict: ConflictKind::BothModified,
                },
            )
            .with_part_path(["b.sketch", "p", "q"]),
        ];
        let table = synthesize(&changes, None);
        assert_eq!(
            group_ids(&table),
            vec!["doc.sketch", "doc.sketch/page1", "b.sketch", "b.sketch/p"]
        );
        assert_eq!(conflicted_groups(&table), vec!["b.sketch", "b.sketch/p"]);
    }
}
