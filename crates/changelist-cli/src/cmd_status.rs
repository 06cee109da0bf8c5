use anyhow::{Context, Result};
use changelist::v1::CompositeLayout;
use changelist_git::StatusConfig;
use std::path::PathBuf;

use crate::view::{self, ViewArgs};

pub fn run(
    repo_path: PathBuf,
    extensions: Vec<String>,
    include_untracked: bool,
    view_args: ViewArgs,
    pretty: bool,
) -> Result<()> {
    let repo_path = if repo_path.is_absolute() {
        repo_path
    } else {
        std::env::current_dir()?.join(&repo_path)
    };

    let repo = git2::Repository::open(&repo_path)
        .with_context(|| format!("Failed to open repository at {:?}", repo_path))?;

    let config = StatusConfig {
        layout: CompositeLayout::new(extensions),
        include_untracked,
    };
    let changes = changelist_git::collect_changes(&repo, &config)?;

    view::show(changes, &view_args, pretty)
}
