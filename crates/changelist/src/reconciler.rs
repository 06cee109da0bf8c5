//! Long-lived owner of the node table for one list view.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::project::{project, row_of};
use crate::selection::{RowSelection, SelectionHandler, dispatch_selection, select_row};
use crate::synthesize::synthesize;
use crate::types::{ChangeRecord, Node, NodeId, NodeTable};

/// Row height handed to the list view, in pixels.
pub const DEFAULT_ROW_HEIGHT: u32 = 29;

/// When [`Reconciler::rebuild`] actually re-synthesizes the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildPolicy {
    /// Re-synthesize on every rebuild. Expand state is still preserved.
    #[default]
    Always,
    /// Keep the current tree while the selection is the same as on the
    /// previous rebuild, even if the change list differs. The first rebuild
    /// always runs.
    SkipWhenSelectionUnchanged,
}

/// Configuration for a [`Reconciler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub policy: RebuildPolicy,
    pub row_height: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            policy: RebuildPolicy::Always,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

/// Result of a [`Reconciler::rebuild`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Rebuilt,
    Skipped,
}

/// Owns the node table across rebuilds and publishes the visible rows.
///
/// Rebuilds and toggles compose through the same table: a toggle sees the
/// table of the latest rebuild, and the next rebuild reads expand state from
/// the table the toggle left behind.
///
/// ```
/// use changelist::v1::{ChangeRecord, ChangeStatus, ReconcileConfig, Reconciler};
///
/// let mut view = Reconciler::new(ReconcileConfig::default());
/// view.rebuild(
///     vec![ChangeRecord::new("doc.sketch/page1/layer1", ChangeStatus::Modified)
///         .with_part_path(["doc.sketch", "page1", "layer1"])],
///     &[],
/// );
/// assert_eq!(view.row_count(), 1);
///
/// assert!(view.toggle_group("doc.sketch/page1", true));
/// let labels: Vec<&str> = view.current_view().iter().map(|n| n.label()).collect();
/// assert_eq!(labels, vec!["doc.sketch", "page1", "layer1"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
    table: NodeTable,
    changes: Vec<ChangeRecord>,
    /// Selection passed to the last rebuild that ran; `None` before the first.
    selection: Option<Vec<String>>,
    view: Vec<Node>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Re-derive the tree for a new change list.
    ///
    /// `selection` holds the identifiers currently selected in the view; it
    /// only matters under [`RebuildPolicy::SkipWhenSelectionUnchanged`].
    pub fn rebuild(&mut self, changes: Vec<ChangeRecord>, selection: &[String]) -> RebuildOutcome {
        if self.config.policy == RebuildPolicy::SkipWhenSelectionUnchanged
            && self.selection.as_deref() == Some(selection)
        {
            debug!(
                "Skipping rebuild of {} changes, selection unchanged",
                changes.len()
            );
            return RebuildOutcome::Skipped;
        }

        self.table = synthesize(&changes, Some(&self.table));
        self.changes = changes;
        self.selection = Some(selection.to_vec());
        self.republish();
        RebuildOutcome::Rebuilt
    }

    /// Expand or collapse one group.
    ///
    /// Returns false, leaving everything untouched, when `group_id` is not a
    /// group in the current table.
    pub fn toggle_group(&mut self, group_id: &str, expanded: bool) -> bool {
        if !self.table.set_expanded(group_id, expanded) {
            debug!("Ignoring toggle of unknown group {}", group_id);
            return false;
        }
        self.resynthesize();
        true
    }

    /// Expand or collapse every group at once.
    pub fn set_all_expanded(&mut self, expanded: bool) {
        let ids: Vec<String> = self.table.groups().map(|g| g.group_id.clone()).collect();
        for id in &ids {
            self.table.set_expanded(id, expanded);
        }
        self.resynthesize();
    }

    /// Visible rows from the latest rebuild or toggle.
    pub fn current_view(&self) -> &[Node] {
        &self.view
    }

    pub fn row_count(&self) -> usize {
        self.view.len()
    }

    pub fn row_height(&self) -> u32 {
        self.config.row_height
    }

    /// Row currently showing `id`, for restoring a selection after a rebuild.
    pub fn row_of(&self, id: &NodeId) -> Option<usize> {
        row_of(&self.view, id)
    }

    pub fn select(&self, index: usize) -> Option<RowSelection<'_>> {
        select_row(&self.view, index)
    }

    pub fn dispatch_selection<H>(&self, index: usize, handler: &mut H) -> bool
    where
        H: SelectionHandler + ?Sized,
    {
        dispatch_selection(&self.view, index, handler)
    }

    pub fn table(&self) -> &NodeTable {
        &self.table
    }

    /// The change list the current table was synthesized from.
    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }

    fn resynthesize(&mut self) {
        self.table = synthesize(&self.changes, Some(&self.table));
        self.republish();
    }

    fn republish(&mut self) {
        self.view = project(&self.table);
        debug!(
            "Published {} of {} nodes",
            self.view.len(),
            self.table.len()
        );
    }
}
