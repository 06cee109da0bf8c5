//! Mapping view rows back to the node they show.

use crate::types::{ChangeRecord, GroupNode, Node, NodeId};

/// What a selected row refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelection<'a> {
    /// A changed file, plain or part of a document.
    File(&'a ChangeRecord),
    /// A document root group (depth 0).
    Document(&'a GroupNode),
    /// A nested part group (depth 1 or deeper).
    Part(&'a GroupNode),
}

impl RowSelection<'_> {
    pub fn id(&self) -> NodeId {
        match self {
            RowSelection::File(change) => NodeId::file(&change.path),
            RowSelection::Document(group) | RowSelection::Part(group) => {
                NodeId::group(&group.group_id)
            }
        }
    }
}

/// Receives row selections, one method per kind of row.
pub trait SelectionHandler {
    fn on_file_selected(&mut self, change: &ChangeRecord);
    fn on_document_selected(&mut self, group: &GroupNode);
    fn on_part_selected(&mut self, group: &GroupNode);
}

/// Resolve row `index` of a projected view. Out-of-range rows yield `None`.
pub fn select_row(rows: &[Node], index: usize) -> Option<RowSelection<'_>> {
    match rows.get(index)? {
        Node::File(file) => Some(RowSelection::File(&file.change)),
        Node::Group(group) if group.is_document_root() => Some(RowSelection::Document(group)),
        Node::Group(group) => Some(RowSelection::Part(group)),
    }
}

/// Route row `index` to the matching handler method.
///
/// Returns false, without calling the handler, when `index` is out of range.
pub fn dispatch_selection<H>(rows: &[Node], index: usize, handler: &mut H) -> bool
where
    H: SelectionHandler + ?Sized,
{
    match select_row(rows, index) {
        Some(RowSelection::File(change)) => handler.on_file_selected(change),
        Some(RowSelection::Document(group)) => handler.on_document_selected(group),
        Some(RowSelection::Part(group)) => handler.on_part_selected(group),
        None => return false,
    }
    true
}
