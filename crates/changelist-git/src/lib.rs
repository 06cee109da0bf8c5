#![doc = include_str!("../README.md")]

use anyhow::{Context, Result};
use changelist::v1::{ChangeRecord, ChangeStatus, CompositeLayout, ConflictKind};
use git2::{Repository, Status, StatusEntry, StatusOptions};
use std::collections::HashMap;
use tracing::{debug, warn};

// ============================================================================
// Public configuration
// ============================================================================

/// Configuration for reading change records from a working tree.
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// Which directories are composite documents.
    pub layout: CompositeLayout,
    /// Report untracked files. Untracked directories are reported as a
    /// single `dir/` entry rather than file by file.
    pub include_untracked: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            layout: CompositeLayout::default(),
            include_untracked: true,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Read the working-tree status of `repo` as change records, sorted by path.
///
/// Sorting keeps the parts of one composite document next to each other,
/// which is the order the tree view expects.
pub fn collect_changes(repo: &Repository, config: &StatusConfig) -> Result<Vec<ChangeRecord>> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(config.include_untracked)
        .recurse_untracked_dirs(false)
        .include_ignored(false)
        .renames_head_to_index(true)
        .renames_index_to_workdir(true);

    let statuses = repo
        .statuses(Some(&mut opts))
        .context("Failed to read repository status")?;
    let conflicts = conflict_kinds(repo)?;

    let mut changes = Vec::with_capacity(statuses.len());
    for entry in statuses.iter() {
        let renamed = rename_paths(&entry);
        let path = match (&renamed, entry.path()) {
            (Some((_, to)), _) => to.clone(),
            (None, Some(path)) => path.to_string(),
            (None, None) => {
                warn!("Skipping status entry with a non UTF-8 path");
                continue;
            }
        };

        let from = renamed.map(|(from, _)| from);
        let conflict = conflicts.get(&path).copied();
        let Some(status) = map_status(entry.status(), from, conflict) else {
            continue;
        };

        changes.push(ChangeRecord::in_layout(path, status, &config.layout));
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Collected {} changes", changes.len());
    Ok(changes)
}

/// Map git status bits to a [`ChangeStatus`].
///
/// Conflicts take precedence, then renames, then additions, deletions and
/// modifications. Returns `None` for entries that are not changes (ignored
/// or unmodified files).
pub fn map_status(
    status: Status,
    renamed_from: Option<String>,
    conflict: Option<ConflictKind>,
) -> Option<ChangeStatus> {
    if status.is_conflicted() {
        return Some(ChangeStatus::Conflicted {
            conflict: conflict.unwrap_or(ConflictKind::BothModified),
        });
    }

    if (status.is_index_renamed() || status.is_wt_renamed())
        && let Some(from) = renamed_from
    {
        return Some(ChangeStatus::Renamed { from });
    }

    if status.is_index_new() {
        Some(ChangeStatus::New)
    } else if status.is_wt_new() {
        Some(ChangeStatus::Untracked)
    } else if status.is_index_deleted() || status.is_wt_deleted() {
        Some(ChangeStatus::Deleted)
    } else if status.is_index_modified()
        || status.is_wt_modified()
        || status.is_index_typechange()
        || status.is_wt_typechange()
        || status.is_index_renamed()
        || status.is_wt_renamed()
    {
        Some(ChangeStatus::Modified)
    } else {
        None
    }
}

/// Classify a conflict by which index stages are present.
///
/// # Examples
///
/// ```
/// use changelist::v1::ConflictKind;
/// use changelist_git::conflict_kind;
///
/// assert_eq!(conflict_kind(true, true, true), Some(ConflictKind::BothModified));
/// assert_eq!(conflict_kind(true, false, true), Some(ConflictKind::DeletedByUs));
/// assert_eq!(conflict_kind(false, false, false), None);
/// ```
pub fn conflict_kind(ancestor: bool, ours: bool, theirs: bool) -> Option<ConflictKind> {
    match (ancestor, ours, theirs) {
        (true, true, true) => Some(ConflictKind::BothModified),
        (false, true, true) => Some(ConflictKind::BothAdded),
        (true, false, false) => Some(ConflictKind::BothDeleted),
        (false, true, false) => Some(ConflictKind::AddedByUs),
        (false, false, true) => Some(ConflictKind::AddedByThem),
        (true, false, true) => Some(ConflictKind::DeletedByUs),
        (true, true, false) => Some(ConflictKind::DeletedByThem),
        (false, false, false) => None,
    }
}

/// Porcelain-style one-letter code for a status.
///
/// # Examples
///
/// ```
/// use changelist::v1::ChangeStatus;
/// use changelist_git::status_code;
///
/// assert_eq!(status_code(&ChangeStatus::Modified), 'M');
/// assert_eq!(status_code(&ChangeStatus::Untracked), '?');
/// ```
pub fn status_code(status: &ChangeStatus) -> char {
    match status {
        ChangeStatus::New => 'A',
        ChangeStatus::Modified => 'M',
        ChangeStatus::Deleted => 'D',
        ChangeStatus::Renamed { .. } => 'R',
        ChangeStatus::Copied { .. } => 'C',
        ChangeStatus::Untracked => '?',
        ChangeStatus::Conflicted { .. } => 'U',
    }
}

// ============================================================================
// Private helpers
// ============================================================================

/// `(from, to)` for a renamed entry, preferring the staged rename.
fn rename_paths(entry: &StatusEntry) -> Option<(String, String)> {
    let status = entry.status();
    let delta = if status.is_index_renamed() {
        entry.head_to_index()
    } else if status.is_wt_renamed() {
        entry.index_to_workdir()
    } else {
        None
    }?;

    let from = delta.old_file().path()?.to_str()?.to_string();
    let to = delta.new_file().path()?.to_str()?.to_string();
    Some((from, to))
}

fn conflict_kinds(repo: &Repository) -> Result<HashMap<String, ConflictKind>> {
    let index = repo.index().context("Failed to open repository index")?;
    let mut kinds = HashMap::new();
    if !index.has_conflicts() {
        return Ok(kinds);
    }

    for conflict in index.conflicts()? {
        let conflict = conflict?;
        let kind = conflict_kind(
            conflict.ancestor.is_some(),
            conflict.our.is_some(),
            conflict.their.is_some(),
        );
        let path = [&conflict.our, &conflict.their, &conflict.ancestor]
            .into_iter()
            .flatten()
            .next()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned());

        if let (Some(path), Some(kind)) = (path, kind) {
            kinds.insert(path, kind);
        }
    }

    Ok(kinds)
}
