use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::layout::CompositeLayout;

// ============================================================================
// Change records
// ============================================================================

/// One file-level change as reported by the change-detection source.
///
/// A record is either a plain file (`part_path` empty) or a part inside a
/// composite document. For parts, the first segment of `part_path` names the
/// document, the last segment names the file itself, and every segment in
/// between is a nested part.
///
/// # Builder API
///
/// ```
/// use changelist::v1::{ChangeRecord, ChangeStatus};
///
/// let change = ChangeRecord::new("doc.sketch/page1/layer1", ChangeStatus::Modified)
///     .with_part_path(["doc.sketch", "page1", "layer1"]);
///
/// assert_eq!(change.label(), "layer1");
/// assert_eq!(change.depth(), 2);
/// ```
///
/// # JSON shape
///
/// ```json
/// {
///   "path": "doc.sketch/page1/layer1",
///   "part_path": ["doc.sketch", "page1", "layer1"],
///   "status": "modified"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub part_path: Vec<String>,
    pub status: ChangeStatus,
    /// The change adds a whole composite document that has not been
    /// decomposed into parts yet.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_composite: bool,
}

/// Kind of change reported for a path.
///
/// Serialized in snake case; unit variants are bare strings (`"modified"`)
/// and the data-carrying variants are single-key objects
/// (`{ "renamed": { "from": "old.txt" } }`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    New,
    Modified,
    Deleted,
    Renamed { from: String },
    Copied { from: String },
    Untracked,
    Conflicted { conflict: ConflictKind },
}

/// Which sides of a merge touched a conflicted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    BothModified,
    BothAdded,
    BothDeleted,
    AddedByUs,
    AddedByThem,
    DeletedByUs,
    DeletedByThem,
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeStatus::New => write!(f, "new"),
            ChangeStatus::Modified => write!(f, "modified"),
            ChangeStatus::Deleted => write!(f, "deleted"),
            ChangeStatus::Renamed { from } => write!(f, "renamed from {}", from),
            ChangeStatus::Copied { from } => write!(f, "copied from {}", from),
            ChangeStatus::Untracked => write!(f, "untracked"),
            ChangeStatus::Conflicted { conflict } => write!(f, "conflicted ({})", conflict),
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConflictKind::BothModified => "both modified",
            ConflictKind::BothAdded => "both added",
            ConflictKind::BothDeleted => "both deleted",
            ConflictKind::AddedByUs => "added by us",
            ConflictKind::AddedByThem => "added by them",
            ConflictKind::DeletedByUs => "deleted by us",
            ConflictKind::DeletedByThem => "deleted by them",
        };
        f.write_str(s)
    }
}

impl ChangeStatus {
    /// The conflict kind, if this is a conflicted change.
    pub fn conflict(&self) -> Option<ConflictKind> {
        match self {
            ChangeStatus::Conflicted { conflict } => Some(*conflict),
            _ => None,
        }
    }

    pub fn is_conflicted(&self) -> bool {
        self.conflict().is_some()
    }
}

impl ChangeRecord {
    /// Create a plain (non-composite) change record.
    pub fn new(path: impl Into<String>, status: ChangeStatus) -> Self {
        Self {
            path: path.into(),
            part_path: Vec::new(),
            status,
            is_composite: false,
        }
    }

    /// Create a record whose part path is derived from `layout`.
    ///
    /// ```
    /// use changelist::v1::{ChangeRecord, ChangeStatus, CompositeLayout};
    ///
    /// let layout = CompositeLayout::default();
    /// let part = ChangeRecord::in_layout("doc.sketch/pages/cover.json", ChangeStatus::Modified, &layout);
    /// assert_eq!(part.part_path, vec!["doc.sketch", "pages", "cover.json"]);
    ///
    /// let fresh = ChangeRecord::in_layout("new.sketch/", ChangeStatus::Untracked, &layout);
    /// assert!(fresh.is_composite);
    /// assert_eq!(fresh.part_path, vec!["new.sketch"]);
    /// ```
    pub fn in_layout(path: impl Into<String>, status: ChangeStatus, layout: &CompositeLayout) -> Self {
        let path = path.into();
        Self {
            part_path: layout.part_path(&path),
            is_composite: layout.is_fresh_document(&path),
            path,
            status,
        }
    }

    pub fn with_part_path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.part_path = segments.into_iter().map(Into::into).collect();
        self
    }

    pub fn composite(mut self) -> Self {
        self.is_composite = true;
        self
    }

    /// True for a newly added composite document that has not been split
    /// into parts: either flagged explicitly, or reported as the document
    /// directory itself (`part_path == [p]` and `path == "p/"`).
    pub fn is_fresh_composite(&self) -> bool {
        if self.is_composite {
            return true;
        }
        match self.part_path.as_slice() {
            [only] => self
                .path
                .strip_suffix('/')
                .is_some_and(|dir| dir == only.as_str()),
            _ => false,
        }
    }

    /// Text shown on the file's row: the last part segment, or the full path.
    pub fn label(&self) -> &str {
        if self.is_fresh_composite() {
            return &self.path;
        }
        self.part_path.last().map_or(self.path.as_str(), String::as_str)
    }

    /// Nesting depth of the file's row (0 for plain files).
    pub fn depth(&self) -> usize {
        if self.is_fresh_composite() {
            0
        } else {
            self.part_path.len().saturating_sub(1)
        }
    }

    /// Reject records no upstream collaborator should ever produce.
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(Error::InvalidChange {
                path: self.path.clone(),
                reason: "empty path".to_string(),
            });
        }
        if self.part_path.iter().any(|segment| segment.is_empty()) {
            return Err(Error::InvalidChange {
                path: self.path.clone(),
                reason: "empty part path segment".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON array of change records.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        let changes: Vec<Self> = serde_json::from_str(json)?;
        for change in &changes {
            change.validate()?;
        }
        Ok(changes)
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Stable identity of a node across rebuilds.
///
/// Files and groups live in separate key spaces, so a file path can never
/// shadow a group id that happens to spell the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    File(String),
    Group(String),
}

impl NodeId {
    pub fn file(path: impl Into<String>) -> Self {
        NodeId::File(path.into())
    }

    pub fn group(group_id: impl Into<String>) -> Self {
        NodeId::Group(group_id.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeId::File(s) | NodeId::Group(s) => s,
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf node wrapping one real change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub change: ChangeRecord,
    pub display_index: usize,
    pub visible: bool,
}

/// Synthesized node for one proper prefix of a part path.
///
/// `expanded` is the only field carried over from one rebuild to the next;
/// everything else is re-derived from the change list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    /// `/`-join of the part-path prefix.
    pub group_id: String,
    /// 0 for the document root, 1 for a first-level part, and so on.
    pub depth: usize,
    pub label: String,
    pub expanded: bool,
    pub visible: bool,
    /// Conflict of the first conflicted descendant seen during synthesis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_status: Option<ConflictKind>,
    pub display_index: usize,
}

impl GroupNode {
    pub fn is_document_root(&self) -> bool {
        self.depth == 0
    }
}

/// A row of the reconciled tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    File(FileNode),
    Group(GroupNode),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::File(file) => NodeId::file(&file.change.path),
            Node::Group(group) => NodeId::group(&group.group_id),
        }
    }

    pub fn display_index(&self) -> usize {
        match self {
            Node::File(file) => file.display_index,
            Node::Group(group) => group.display_index,
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            Node::File(file) => file.visible,
            Node::Group(group) => group.visible,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::File(file) => file.change.depth(),
            Node::Group(group) => group.depth,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Node::File(file) => file.change.label(),
            Node::Group(group) => &group.label,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(group) => Some(group),
            Node::File(_) => None,
        }
    }
}

// ============================================================================
// Node table
// ============================================================================

/// All nodes produced by one synthesis pass, keyed by [`NodeId`].
///
/// Storage order carries no meaning; display order comes from each node's
/// `display_index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTable {
    nodes: HashMap<NodeId, Node>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a group by its `/`-joined id.
    pub fn group(&self, group_id: &str) -> Option<&GroupNode> {
        self.nodes
            .get(&NodeId::group(group_id))
            .and_then(Node::as_group)
    }

    /// Look up a file by its path.
    pub fn file(&self, path: &str) -> Option<&FileNode> {
        self.nodes.get(&NodeId::file(path)).and_then(Node::as_file)
    }

    /// Iterate nodes in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupNode> {
        self.nodes.values().filter_map(Node::as_group)
    }

    /// Insert a node, returning the node it replaced.
    pub(crate) fn insert(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id(), node)
    }

    pub(crate) fn group_mut(&mut self, group_id: &str) -> Option<&mut GroupNode> {
        match self.nodes.get_mut(&NodeId::group(group_id)) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Set a group's `expanded` flag in place. Returns false when no group
    /// with that id exists.
    pub(crate) fn set_expanded(&mut self, group_id: &str, expanded: bool) -> bool {
        match self.group_mut(group_id) {
            Some(group) => {
                group.expanded = expanded;
                true
            }
            None => false,
        }
    }
}
