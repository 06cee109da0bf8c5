#![doc = include_str!("../README.md")]

mod error;
mod layout;
mod project;
mod reconciler;
mod selection;
mod synthesize;
mod types;

pub mod v1 {
    //! Versioned public API for the change-list tree.
    //!
    //! Everything you need is re-exported from this module. Types are
    //! organized into four groups:
    //!
    //! # Input
    //!
    //! - [`ChangeRecord`] — one changed file, optionally a part of a composite document
    //! - [`ChangeStatus`] / [`ConflictKind`] — what happened to it
    //! - [`CompositeLayout`] — turns repository paths into part paths
    //!
    //! # Node table
    //!
    //! - [`Node`] — either a [`FileNode`] or a synthesized [`GroupNode`]
    //! - [`NodeId`] — stable identity of a node across rebuilds
    //! - [`NodeTable`] — all nodes of one synthesis pass
    //!
    //! # Pure functions
    //!
    //! - [`synthesize`] — change list plus previous table → new table
    //! - [`project`] — table → visible rows in display order
    //!
    //! # View state
    //!
    //! - [`Reconciler`] — owns the table, applies rebuilds and toggles
    //! - [`ReconcileConfig`] / [`RebuildPolicy`] — how it behaves
    //! - [`RowSelection`] / [`SelectionHandler`] — rows back to nodes
    //!
    //! # Example — rebuild, expand, select
    //!
    //! ```
    //! use changelist::v1::*;
    //!
    //! let layout = CompositeLayout::default();
    //! let changes = vec![
    //!     ChangeRecord::new("readme.md", ChangeStatus::Modified),
    //!     ChangeRecord::in_layout("doc.sketch/page1/layer1", ChangeStatus::Modified, &layout),
    //! ];
    //!
    //! let mut view = Reconciler::new(ReconcileConfig::default());
    //! view.rebuild(changes, &[]);
    //! assert_eq!(view.row_count(), 2);
    //!
    //! view.toggle_group("doc.sketch/page1", true);
    //! assert_eq!(view.row_count(), 4);
    //!
    //! match view.select(2) {
    //!     Some(RowSelection::Part(group)) => assert_eq!(group.label, "page1"),
    //!     other => panic!("unexpected selection {:?}", other),
    //! }
    //! ```
    pub use crate::error::{Error, Result};
    pub use crate::layout::CompositeLayout;
    pub use crate::project::{conflicted_groups, group_ids, project, row_of};
    pub use crate::reconciler::{
        DEFAULT_ROW_HEIGHT, RebuildOutcome, RebuildPolicy, ReconcileConfig, Reconciler,
    };
    pub use crate::selection::{RowSelection, SelectionHandler, dispatch_selection, select_row};
    pub use crate::synthesize::synthesize;
    pub use crate::types::{
        ChangeRecord, ChangeStatus, ConflictKind, FileNode, GroupNode, Node, NodeId, NodeTable,
    };
}
