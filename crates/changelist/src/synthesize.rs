//! Flat change list → node table.

use tracing::{debug, warn};

use crate::types::{ChangeRecord, ConflictKind, FileNode, GroupNode, Node, NodeId, NodeTable};

/// Build a fresh node table from `changes`.
///
/// Groups are re-derived from scratch on every call. The only thing read
/// from `previous` is each group's `expanded` flag, looked up by group id;
/// groups not found there start expanded at depth 0 and collapsed below.
/// `previous` is never modified.
///
/// Display indices are handed out in first-seen order, so the table's
/// indices are exactly `0..table.len()`.
///
/// # Examples
///
/// ```
/// use changelist::v1::{ChangeRecord, ChangeStatus, synthesize};
///
/// let changes = vec![
///     ChangeRecord::new("doc.sketch/page1/layer1", ChangeStatus::Modified)
///         .with_part_path(["doc.sketch", "page1", "layer1"]),
/// ];
///
/// let table = synthesize(&changes, None);
/// assert_eq!(table.len(), 3);
///
/// let root = table.group("doc.sketch").unwrap();
/// assert!(root.expanded && root.visible);
///
/// let page = table.group("doc.sketch/page1").unwrap();
/// assert!(!page.expanded && !page.visible);
/// ```
pub fn synthesize(changes: &[ChangeRecord], previous: Option<&NodeTable>) -> NodeTable {
    let mut pass = Pass::new(previous, changes.len());

    for change in changes {
        if change.part_path.is_empty() || change.is_fresh_composite() {
            pass.ancestors.clear();
            pass.emit_file(change, true);
            continue;
        }

        let conflict = change.status.conflict();
        let group_count = change.part_path.len() - 1;
        for depth in 0..group_count {
            pass.enter_group(&change.part_path[..=depth], conflict);
        }
        // A shallower part than the previous change: drop the deeper frames.
        pass.ancestors.truncate(group_count);

        let visible = pass
            .ancestors
            .last()
            .is_none_or(|parent| parent.expanded && parent.visible);
        pass.emit_file(change, visible);
    }

    debug!(
        "Synthesized {} nodes from {} changes",
        pass.table.len(),
        changes.len()
    );
    pass.table
}

/// One group on the path from the document root to the current change.
struct Frame {
    group_id: String,
    expanded: bool,
    visible: bool,
}

impl Frame {
    fn of(group: &GroupNode) -> Self {
        Self {
            group_id: group.group_id.clone(),
            expanded: group.expanded,
            visible: group.visible,
        }
    }
}

/// Loop state for a single synthesis pass.
struct Pass<'a> {
    previous: Option<&'a NodeTable>,
    table: NodeTable,
    next_index: usize,
    /// `ancestors[d]` is the most recent group at depth `d`.
    ancestors: Vec<Frame>,
}

impl<'a> Pass<'a> {
    fn new(previous: Option<&'a NodeTable>, capacity: usize) -> Self {
        Self {
            previous,
            table: NodeTable::with_capacity(capacity),
            next_index: 0,
            ancestors: Vec::new(),
        }
    }

    fn take_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    /// Make the group for `prefix` the current ancestor at its depth,
    /// synthesizing it unless this pass already produced it.
    fn enter_group(&mut self, prefix: &[String], conflict: Option<ConflictKind>) {
        let depth = prefix.len() - 1;
        let group_id = prefix.join("/");

        // Same prefix as the previous change at this depth.
        if self
            .ancestors
            .get(depth)
            .is_some_and(|frame| frame.group_id == group_id)
        {
            self.ancestors.truncate(depth + 1);
            self.attach_conflict(&group_id, conflict);
            return;
        }
        self.ancestors.truncate(depth);

        // Seen earlier in this pass, but not by the immediately preceding change.
        if let Some(existing) = self.table.group(&group_id) {
            let frame = Frame::of(existing);
            self.attach_conflict(&group_id, conflict);
            self.ancestors.push(frame);
            return;
        }

        let expanded = self
            .previous
            .and_then(|table| table.group(&group_id))
            .map_or(depth == 0, |group| group.expanded);
        let visible = depth == 0
            || (expanded
                && self
                    .ancestors
                    .last()
                    .is_some_and(|parent| parent.expanded && parent.visible));

        let group = GroupNode {
            label: prefix[depth].clone(),
            group_id,
            depth,
            expanded,
            visible,
            conflict_status: conflict,
            display_index: self.take_index(),
        };
        self.ancestors.push(Frame::of(&group));
        self.table.insert(Node::Group(group));
    }

    /// First conflict wins: a group that already carries a conflict keeps it.
    fn attach_conflict(&mut self, group_id: &str, conflict: Option<ConflictKind>) {
        if let Some(conflict) = conflict
            && let Some(group) = self.table.group_mut(group_id)
            && group.conflict_status.is_none()
        {
            group.conflict_status = Some(conflict);
        }
    }

    fn emit_file(&mut self, change: &ChangeRecord, visible: bool) {
        let display_index = match self.table.get(&NodeId::file(&change.path)) {
            Some(existing) => {
                warn!("Duplicate change for {}, keeping the later record", change.path);
                existing.display_index()
            }
            None => self.take_index(),
        };
        self.table.insert(Node::File(FileNode {
            change: change.clone(),
            display_index,
            visible,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChangeStatus, ConflictKind};
    use std::collections::BTreeSet;

    fn part(path: &[&str]) -> ChangeRecord {
        ChangeRecord::new(path.join("/"), ChangeStatus::Modified).with_part_path(path.iter().copied())
    }

    fn conflicted(path: &[&str], conflict: ConflictKind) -> ChangeRecord {
        ChangeRecord::new(path.join("/"), ChangeStatus::Conflicted { conflict })
            .with_part_path(path.iter().copied())
    }

    fn indices(table: &NodeTable) -> BTreeSet<usize> {
        table.iter().map(Node::display_index).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(synthesize(&[], None).is_empty());
    }

    #[test]
    fn test_plain_file() {
        let table = synthesize(&[ChangeRecord::new("readme.md", ChangeStatus::Modified)], None);
        assert_eq!(table.len(), 1);
        let file = table.file("readme.md").unwrap();
        assert!(file.visible);
        assert_eq!(file.display_index, 0);
    }

    #[test]
    fn test_nested_part_defaults() {
        let table = synthesize(&[part(&["doc.sketch", "page1", "layer1"])], None);
        assert_eq!(table.len(), 3);

        let root = table.group("doc.sketch").unwrap();
        assert_eq!((root.depth, root.display_index), (0, 0));
        assert!(root.expanded && root.visible);

        let page = table.group("doc.sketch/page1").unwrap();
        assert_eq!((page.depth, page.display_index), (1, 1));
        assert_eq!(page.label, "page1");
        assert!(!page.expanded && !page.visible);

        let layer = table.file("doc.sketch/page1/layer1").unwrap();
        assert_eq!(layer.display_index, 2);
        assert!(!layer.visible);
    }

    #[test]
    fn test_fresh_composite_skips_groups() {
        let change = ChangeRecord::new("a.sketch/", ChangeStatus::Untracked).with_part_path(["a.sketch"]);
        let table = synthesize(&[change], None);
        assert_eq!(table.len(), 1);
        assert_eq!(table.groups().count(), 0);
        assert!(table.file("a.sketch/").unwrap().visible);
    }

    #[test]
    fn test_adjacent_changes_share_groups() {
        let changes = vec![
            part(&["doc.sketch", "page1", "a"]),
            part(&["doc.sketch", "page1", "b"]),
            part(&["doc.sketch", "page2", "c"]),
        ];
        let table = synthesize(&changes, None);
        // doc, page1, a, b, page2, c
        assert_eq!(table.len(), 6);
        assert_eq!(table.group("doc.sketch/page2").unwrap().display_index, 4);
        assert_eq!(indices(&table), (0..6).collect());
    }

    #[test]
    fn test_non_adjacent_group_is_reused() {
        let changes = vec![
            part(&["doc.sketch", "page1", "a"]),
            ChangeRecord::new("readme.md", ChangeStatus::Modified),
            part(&["doc.sketch", "page1", "b"]),
        ];
        let table = synthesize(&changes, None);
        assert_eq!(table.groups().count(), 2);
        assert_eq!(table.len(), 5);
        assert_eq!(indices(&table), (0..5).collect());
    }

    #[test]
    fn test_shrinking_part_path_resets_parent() {
        let mut previous = synthesize(
            &[
                part(&["doc.sketch", "page1", "layer1", "shape"]),
                part(&["doc.sketch", "meta.json"]),
            ],
            None,
        );
        previous.set_expanded("doc.sketch/page1", true);
        let table = synthesize(
            &[
                part(&["doc.sketch", "page1", "layer1", "shape"]),
                part(&["doc.sketch", "meta.json"]),
            ],
            Some(&previous),
        );

        // layer1 stays collapsed so shape is hidden...
        assert!(!table.file("doc.sketch/page1/layer1/shape").unwrap().visible);
        // ...but meta.json hangs directly off the expanded root.
        assert!(table.file("doc.sketch/meta.json").unwrap().visible);
    }

    #[test]
    fn test_collapsed_root_hides_first_level_parts() {
        let changes = vec![part(&["doc.sketch", "page1", "layer1"])];
        let mut previous = synthesize(&changes, None);
        previous.set_expanded("doc.sketch", false);
        previous.set_expanded("doc.sketch/page1", true);

        let table = synthesize(&changes, Some(&previous));
        assert!(table.group("doc.sketch").unwrap().visible);
        assert!(!table.group("doc.sketch/page1").unwrap().visible);
        assert!(!table.file("doc.sketch/page1/layer1").unwrap().visible);
    }

    #[test]
    fn test_expand_state_from_previous() {
        let changes = vec![part(&["doc.sketch", "page1", "layer1"])];
        let mut previous = synthesize(&changes, None);
        previous.set_expanded("doc.sketch/page1", true);

        let more = vec![
            part(&["doc.sketch", "page1", "layer1"]),
            part(&["doc.sketch", "page1", "layer2"]),
        ];
        let table = synthesize(&more, Some(&previous));
        assert!(table.group("doc.sketch/page1").unwrap().expanded);
        assert!(table.file("doc.sketch/page1/layer2").unwrap().visible);
        // previous is untouched
        assert_eq!(previous.len(), 3);
    }

    #[test]
    fn test_conflict_first_wins() {
        let changes = vec![
            conflicted(&["doc.sketch", "page1", "a"], ConflictKind::BothModified),
            conflicted(&["doc.sketch", "page1", "b"], ConflictKind::DeletedByThem),
        ];
        let table = synthesize(&changes, None);
        assert_eq!(
            table.group("doc.sketch").unwrap().conflict_status,
            Some(ConflictKind::BothModified)
        );
        assert_eq!(
            table.group("doc.sketch/page1").unwrap().conflict_status,
            Some(ConflictKind::BothModified)
        );
    }

    #[test]
    fn test_conflict_attaches_to_existing_group() {
        let changes = vec![
            part(&["doc.sketch", "page1", "a"]),
            conflicted(&["doc.sketch", "page2", "b"], ConflictKind::BothAdded),
            conflicted(&["doc.sketch", "page1", "c"], ConflictKind::AddedByUs),
        ];
        let table = synthesize(&changes, None);
        assert_eq!(
            table.group("doc.sketch").unwrap().conflict_status,
            Some(ConflictKind::BothAdded)
        );
        assert_eq!(
            table.group("doc.sketch/page2").unwrap().conflict_status,
            Some(ConflictKind::BothAdded)
        );
        assert_eq!(
            table.group("doc.sketch/page1").unwrap().conflict_status,
            Some(ConflictKind::AddedByUs)
        );
    }

    #[test]
    fn test_duplicate_path_last_write_wins() {
        let changes = vec![
            ChangeRecord::new("a.txt", ChangeStatus::Modified),
            ChangeRecord::new("b.txt", ChangeStatus::Modified),
            ChangeRecord::new("a.txt", ChangeStatus::Deleted),
        ];
        let table = synthesize(&changes, None);
        assert_eq!(table.len(), 2);
        let a = table.file("a.txt").unwrap();
        assert_eq!(a.change.status, ChangeStatus::Deleted);
        assert_eq!(a.display_index, 0);
        assert_eq!(indices(&table), (0..2).collect());
    }

    #[test]
    fn test_diverging_then_reconverging_paths() {
        let changes = vec![
            part(&["doc.sketch", "page1", "layer", "x"]),
            part(&["doc.sketch", "page2", "layer", "y"]),
        ];
        let table = synthesize(&changes, None);
        assert!(table.group("doc.sketch/page1/layer").is_some());
        assert!(table.group("doc.sketch/page2/layer").is_some());
        assert_eq!(indices(&table), (0..table.len()).collect());
    }

    #[test]
    fn test_deterministic() {
        let changes = vec![
            ChangeRecord::new("readme.md", ChangeStatus::New),
            part(&["doc.sketch", "page1", "a"]),
            part(&["doc.sketch", "page2", "b"]),
        ];
        assert_eq!(synthesize(&changes, None), synthesize(&changes, None));
    }

    #[test]
    fn test_resynthesis_is_fixed_point() {
        let changes = vec![
            part(&["doc.sketch", "page1", "a"]),
            part(&["other.sketch", "p", "q", "r"]),
            ChangeRecord::new("readme.md", ChangeStatus::New),
        ];
        let first = synthesize(&changes, None);
        let second = synthesize(&changes, Some(&first));
        assert_eq!(first, second);
    }
}
